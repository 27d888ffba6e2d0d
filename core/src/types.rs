use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UploadResp {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    pub download_url: String,
    #[serde(default)]
    pub file_id: String,
    #[serde(default)]
    pub original_name: String,
    #[serde(default)]
    pub processed_name: String,
    #[serde(default)]
    pub file_size: u64,
}

impl UploadResp {
    pub fn success(
        file_id: String,
        original_name: String,
        processed_name: String,
        file_size: u64,
    ) -> Self {
        Self {
            status: "success".to_string(),
            message: "File processed successfully".to_string(),
            download_url: format!("/download/{processed_name}"),
            file_id,
            original_name,
            processed_name,
            file_size,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ToolInfo {
    pub id: String,
    pub name: String,
    pub description: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ToolsResp {
    pub tools: Vec<ToolInfo>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ApiStatus {
    pub message: String,
    pub status: String,
    pub version: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ErrorResp {
    pub detail: String,
}

impl ErrorResp {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}
