use url::form_urlencoded;

use crate::types::ToolInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tool {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

pub const TOOLS: &[Tool] = &[
    Tool {
        id: "compress",
        name: "Compress PDF",
        description: "Reduce PDF file size",
    },
    Tool {
        id: "convert-pdf-to-word",
        name: "PDF to Word",
        description: "Convert PDF to editable DOCX",
    },
    Tool {
        id: "merge",
        name: "Merge PDF",
        description: "Combine multiple PDFs",
    },
    Tool {
        id: "split",
        name: "Split PDF",
        description: "Split PDF into multiple files",
    },
    Tool {
        id: "convert-word-to-pdf",
        name: "Word to PDF",
        description: "Convert DOCX to PDF",
    },
    Tool {
        id: "convert-excel-to-pdf",
        name: "Excel to PDF",
        description: "Convert XLSX to PDF",
    },
    Tool {
        id: "image-to-pdf",
        name: "Image to PDF",
        description: "Convert images to PDF",
    },
    Tool {
        id: "pdf-to-image",
        name: "PDF to Image",
        description: "Convert PDF pages to images",
    },
];

pub fn find(id: &str) -> Option<&'static Tool> {
    TOOLS.iter().find(|tool| tool.id == id)
}

/// Human readable name of a tool, or the id itself for unknown tools.
pub fn display_name(id: &str) -> &str {
    find(id).map(|tool| tool.name).unwrap_or(id)
}

/// Tools whose id, name or description contains `query`, ignoring case.
/// A blank query matches everything.
pub fn search(query: &str) -> Vec<&'static Tool> {
    let query = query.trim().to_lowercase();
    TOOLS
        .iter()
        .filter(|tool| {
            query.is_empty()
                || tool.id.contains(&query)
                || tool.name.to_lowercase().contains(&query)
                || tool.description.to_lowercase().contains(&query)
        })
        .collect()
}

/// Location the search box sends the browser to, `None` for a blank query.
pub fn search_location(query: &str) -> Option<String> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }
    let encoded: String = form_urlencoded::byte_serialize(query.as_bytes()).collect();
    Some(format!("/tools?search={encoded}"))
}

impl From<&Tool> for ToolInfo {
    fn from(tool: &Tool) -> Self {
        Self {
            id: tool.id.to_string(),
            name: tool.name.to_string(),
            description: tool.description.to_string(),
        }
    }
}

pub fn catalogue() -> Vec<ToolInfo> {
    TOOLS.iter().map(ToolInfo::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_falls_back_to_id() {
        assert_eq!(display_name("compress"), "Compress PDF");
        assert_eq!(display_name("ocr"), "ocr");
    }

    #[test]
    fn search_is_case_insensitive() {
        let ids: Vec<_> = search("WORD").iter().map(|tool| tool.id).collect();
        assert_eq!(ids, vec!["convert-pdf-to-word", "convert-word-to-pdf"]);
        assert_eq!(search("  ").len(), TOOLS.len());
        assert!(search("spreadsheet").is_empty());
    }

    #[test]
    fn search_location_encodes_query() {
        assert_eq!(
            search_location(" pdf to word ").as_deref(),
            Some("/tools?search=pdf+to+word")
        );
        assert_eq!(
            search_location("a&b=c").as_deref(),
            Some("/tools?search=a%26b%3Dc")
        );
        assert_eq!(search_location(""), None);
    }

    #[test]
    fn catalogue_lists_every_tool() {
        let catalogue = catalogue();
        assert_eq!(catalogue.len(), 8);
        assert_eq!(catalogue[0].id, "compress");
    }
}
