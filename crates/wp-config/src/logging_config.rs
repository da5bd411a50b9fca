use crate::{DEFAULT_LOG_COLORED, DEFAULT_LOG_DIRECTORY, LogLevel};

use serde::Deserialize;

/// `[logging]` section of config.toml.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    /// ANSI level colors on stderr; ignored for file output
    pub colored: bool,
    /// Log file name, relative to `dir`. None = stderr
    pub file: Option<String>,
    /// Log directory, relative to the config directory
    pub dir: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            colored: DEFAULT_LOG_COLORED,
            file: None,
            dir: String::from(DEFAULT_LOG_DIRECTORY),
        }
    }
}
