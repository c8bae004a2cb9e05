//! Configuration for the logging facility.
//!
//! Loads configuration from `daylog.toml` in the working directory.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::LogError;

/// The config file name
pub const CONFIG_FILE_NAME: &str = "daylog.toml";

/// Default log directory when none is configured.
pub const DEFAULT_LOG_DIR: &str = "./Logs";

/// Configuration loaded from `daylog.toml`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Directory the writer appends into, created on first use.
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
        }
    }
}

fn default_directory() -> PathBuf {
    PathBuf::from(DEFAULT_LOG_DIR)
}

impl LogConfig {
    /// Load configuration from the working directory.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if file exists and parses successfully
    /// - `Ok(None)` if file does not exist
    /// - `Err(...)` if file exists but fails to parse (hard error)
    pub fn load(working_dir: &Path) -> Result<Option<Self>, LogError> {
        let config_path = working_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&config_path).map_err(|e| {
            LogError::Config(format!("Failed to read {}: {}", config_path.display(), e))
        })?;

        let config: LogConfig = toml::from_str(&content).map_err(|e| {
            LogError::Config(format!("Failed to parse {}: {}", config_path.display(), e))
        })?;

        Ok(Some(config))
    }
}
