//! Logging setup
//!
//! Console logging always goes to stderr. In debug mode a daily-rolling file
//! is also written under `.neutron/logs/`.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE_PREFIX: &str = "neutron.log";

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Write a log file and force `debug` verbosity
    pub debug_mode: bool,
    /// Level used when RUST_LOG is unset
    pub level: String,
    /// Directory for log files in debug mode
    pub log_dir: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self {
            debug_mode: false,
            level: "info".to_string(),
            log_dir: default_log_dir(),
        }
    }

    pub fn with_debug_mode(mut self, debug_mode: bool) -> Self {
        self.debug_mode = debug_mode;
        self
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_log_dir(mut self, log_dir: PathBuf) -> Self {
        self.log_dir = log_dir;
        self
    }

    /// Filter directive applied when RUST_LOG is not set
    fn directive(&self) -> String {
        let level = if self.debug_mode { "debug" } else { self.level.as_str() };
        format!("neutron={level},warn")
    }
}

fn default_log_dir() -> PathBuf {
    PathBuf::from(".neutron").join("logs")
}

/// Install the global subscriber.
///
/// Returns the file writer guard in debug mode; keep it alive until exit so
/// buffered lines are flushed.
pub fn init_logging(config: LogConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.directive()))
        .context("Invalid log filter")?;

    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    if config.debug_mode {
        std::fs::create_dir_all(&config.log_dir)
            .with_context(|| format!("Failed to create log directory: {:?}", config.log_dir))?;

        let appender = tracing_appender::rolling::daily(&config.log_dir, LOG_FILE_PREFIX);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let file_layer = fmt::layer().with_writer(writer).with_ansi(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .with(file_layer)
            .try_init()
            .context("Logging already initialized")?;

        tracing::debug!("Debug logging to {}", config.log_dir.display());
        Ok(Some(guard))
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .try_init()
            .context("Logging already initialized")?;
        Ok(None)
    }
}

/// Remove log files older than `days` from `dir`.
pub fn cleanup_old_logs(dir: &Path, days: u64) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let max_age = Duration::from_secs(days * 24 * 60 * 60);
    let now = SystemTime::now();
    let mut removed = 0;

    for entry in std::fs::read_dir(dir).with_context(|| format!("Failed to read {:?}", dir))? {
        let entry = entry?;
        let name = entry.file_name();
        if !name.to_string_lossy().starts_with(LOG_FILE_PREFIX) {
            continue;
        }

        let modified = entry.metadata()?.modified()?;
        if now.duration_since(modified).unwrap_or_default() > max_age {
            std::fs::remove_file(entry.path())?;
            removed += 1;
        }
    }

    Ok(removed)
}
