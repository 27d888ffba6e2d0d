use std::time::Duration;

/// Uploads at or above this many bytes are refused before any request is made.
pub const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

pub const LOCAL_API_BASE_URL: &str = "http://localhost:8000";
pub const PRODUCTION_API_BASE_URL: &str = "https://api.flipfile.online";

pub const DEFAULT_TOOL: &str = "compress";

pub const SAMPLE_FILE_URL: &str =
    "https://www.w3.org/WAI/ER/tests/xhtml/testfiles/resources/pdf/dummy.pdf";

pub const DAILY_TASK_LIMIT: u32 = 3;

pub const PROGRESS_TICK: Duration = Duration::from_millis(200);
pub const PROGRESS_STEP: u8 = 10;
pub const PROGRESS_CAP: u8 = 90;

/// Pause between a successful upload and the download being triggered.
pub const DOWNLOAD_DELAY: Duration = Duration::from_millis(1000);

pub const NOTIFICATION_TTL: Duration = Duration::from_millis(3000);

/// Picks the API the page talks to from the host it was served from.
pub fn api_base_url(hostname: &str) -> &'static str {
    if hostname == "localhost" {
        LOCAL_API_BASE_URL
    } else {
        PRODUCTION_API_BASE_URL
    }
}

pub fn upload_endpoint(base_url: &str) -> String {
    format!("{}/upload", base_url.trim_end_matches('/'))
}
