//! Configuration types, defaults, loading, and validation.

use super::secrets::SecretString;
use crate::speech::{ClientSettings, Credentials, Endpoints, SynthesisOptions};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Baidu open platform credentials
    #[serde(default)]
    pub baidu: BaiduConfig,

    /// Remote endpoint URLs
    #[serde(default)]
    pub endpoints: Endpoints,

    /// Where synthesized audio is written
    #[serde(default)]
    pub output: OutputConfig,

    /// HTTP transport options
    #[serde(default)]
    pub http: HttpConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Default synthesis parameters
    #[serde(default)]
    pub synthesis: SynthesisOptions,
}

/// Client-credentials pair issued by the Baidu console
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BaiduConfig {
    /// API key (loaded from BAIDU_CLIENT_ID if set)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    /// Secret key (loaded from BAIDU_CLIENT_SECRET if set)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<SecretString>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for synthesized `.mp3` files
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("neutron")
        .join("return_audio")
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds. Unset means the transport default (none).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for debug-mode log files (default: .neutron/logs)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. Default values
    /// 2. System config: ~/.config/neutron/config.toml
    /// 3. Local config: ./neutron.toml
    /// 4. Environment variables
    pub fn load() -> Result<Self> {
        tracing::debug!("Loading configuration...");

        let mut config = Self::default();

        if let Some(system_config_path) = Self::system_config_path()
            && system_config_path.exists()
        {
            tracing::debug!("Loading system config from: {:?}", system_config_path);
            config = Self::from_file(&system_config_path)?;
        }

        let local_config_path = Self::local_config_path();
        if local_config_path.exists() {
            tracing::debug!("Loading local config from: {:?}", local_config_path);
            config = Self::from_file(&local_config_path)?;
        }

        config.apply_env_overrides(|key| std::env::var(key).ok())?;

        tracing::debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Load configuration from a specific file path, then apply environment overrides
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Loading configuration from custom path: {:?}", path);

        if !path.exists() {
            anyhow::bail!("Config file not found: {:?}", path);
        }

        let mut config = Self::from_file(path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;

        tracing::debug!("Configuration loaded successfully from custom path");
        Ok(config)
    }

    /// Get the system config path: ~/.config/neutron/config.toml
    pub fn system_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("neutron").join("config.toml"))
    }

    /// Get the local config path: ./neutron.toml
    fn local_config_path() -> PathBuf {
        PathBuf::from("./neutron.toml")
    }

    /// Read a TOML file; a later file replaces an earlier one wholesale
    fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Apply environment variable overrides using `lookup` to read each variable
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(client_id) = lookup("BAIDU_CLIENT_ID") {
            self.baidu.client_id = Some(client_id);
        }

        if let Some(client_secret) = lookup("BAIDU_CLIENT_SECRET") {
            self.baidu.client_secret = Some(SecretString::new(client_secret));
        }

        if let Some(url) = lookup("NEUTRON_TOKEN_URL") {
            self.endpoints.token_url = url;
        }

        if let Some(url) = lookup("NEUTRON_RECOGNITION_URL") {
            self.endpoints.recognition_url = url;
        }

        if let Some(url) = lookup("NEUTRON_SYNTHESIS_URL") {
            self.endpoints.synthesis_url = url;
        }

        if let Some(dir) = lookup("NEUTRON_OUTPUT_DIR") {
            self.output.dir = PathBuf::from(dir);
        }

        if let Some(timeout) = lookup("NEUTRON_HTTP_TIMEOUT") {
            let secs = timeout
                .parse::<u64>()
                .with_context(|| format!("NEUTRON_HTTP_TIMEOUT is not a number: {}", timeout))?;
            self.http.timeout_secs = Some(secs);
        }

        if let Some(level) = lookup("NEUTRON_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Some(dir) = lookup("NEUTRON_LOG_DIR") {
            self.logging.dir = Some(PathBuf::from(dir));
        }

        Ok(())
    }

    /// Check whether both halves of the credential pair are present
    pub fn has_credentials(&self) -> bool {
        self.baidu.client_id.as_deref().is_some_and(|id| !id.is_empty())
            && self
                .baidu
                .client_secret
                .as_ref()
                .is_some_and(|secret| !secret.is_empty())
    }

    /// Build the credential pair, failing with a hint if either half is missing
    pub fn credentials(&self) -> Result<Credentials> {
        let client_id = self
            .baidu
            .client_id
            .clone()
            .filter(|id| !id.is_empty())
            .context("Baidu client_id not configured (set BAIDU_CLIENT_ID or [baidu].client_id)")?;
        let client_secret = self
            .baidu
            .client_secret
            .clone()
            .filter(|secret| !secret.is_empty())
            .context(
                "Baidu client_secret not configured (set BAIDU_CLIENT_SECRET or [baidu].client_secret)",
            )?;

        Ok(Credentials::new(client_id, client_secret))
    }

    /// Settings handed to the speech client at construction
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            endpoints: self.endpoints.clone(),
            output_dir: self.output.dir.clone(),
            timeout: self.http.timeout_secs.map(Duration::from_secs),
        }
    }

    pub fn validate(&self) -> Result<()> {
        tracing::debug!("Validating configuration...");

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            anyhow::bail!(
                "Invalid log level: {}. Must be one of: {:?}",
                self.logging.level,
                valid_levels
            );
        }

        for (name, url) in [
            ("token_url", &self.endpoints.token_url),
            ("recognition_url", &self.endpoints.recognition_url),
            ("synthesis_url", &self.endpoints.synthesis_url),
        ] {
            if url.trim().is_empty() {
                anyhow::bail!("Endpoint {} is empty", name);
            }
        }

        if self.http.timeout_secs == Some(0) {
            anyhow::bail!("http.timeout_secs must be greater than zero");
        }

        tracing::debug!("Configuration validation passed");
        Ok(())
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let toml_string =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        fs::write(path, toml_string)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        tracing::info!("Configuration saved to: {:?}", path);
        Ok(())
    }
}
