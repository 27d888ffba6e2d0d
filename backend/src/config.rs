use anyhow::Context;
use flipfile_core::config::MAX_FILE_SIZE;
use once_cell::sync::Lazy;
use serde::Deserialize;

fn default_listen_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_upload_dir() -> String {
    "uploads".to_string()
}

fn default_max_file_size() -> u64 {
    MAX_FILE_SIZE
}

fn default_file_ttl_secs() -> u64 {
    3600
}

fn default_cleanup_interval_secs() -> u64 {
    3600
}

fn default_max_concurrent_tasks() -> usize {
    5
}

fn default_file_id_length() -> usize {
    16
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "https://flipfile.online".to_string(),
        "http://localhost:3000".to_string(),
    ]
}

fn deserialize_allowed_origins<'de, D>(d: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(d)?;
    Ok(s.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect())
}

#[derive(Deserialize)]
pub struct Config {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,

    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    #[serde(default = "default_file_ttl_secs")]
    pub file_ttl_secs: u64,

    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,

    #[serde(default = "default_max_concurrent_tasks")]
    pub max_concurrent_tasks: usize,

    #[serde(default = "default_file_id_length")]
    pub file_id_length: usize,

    #[serde(
        default = "default_allowed_origins",
        deserialize_with = "deserialize_allowed_origins"
    )]
    pub allowed_origins: Vec<String>,
}

pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    envy::from_env()
        .context("failed to parse config from environment variables")
        .unwrap()
});
