pub mod config;
pub mod tools;
pub mod types;
pub mod upload;
pub mod usage;
