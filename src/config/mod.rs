//! Configuration Module
//!
//! Loads credentials, endpoint URLs, output directory and logging options from
//! TOML files and environment variables.

pub mod secrets;
mod types;

pub use secrets::SecretString;
pub use types::{BaiduConfig, Config, HttpConfig, LoggingConfig, OutputConfig};
