use std::panic::Location;

use error_location::ErrorLocation;
use thiserror::Error;
use wp_config::{ConfigError, KEY_PORT};
use wp_control::ControlError;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Control(#[from] ControlError),

    #[error("Logger error: {message} {location}")]
    Logger {
        message: String,
        location: ErrorLocation,
    },
}

impl CliError {
    #[track_caller]
    pub fn logger<S: Into<String>>(message: S) -> Self {
        Self::Logger {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Expected outcomes: print the message and exit 0.
    pub fn is_benign(&self) -> bool {
        matches!(self, Self::Control(e) if e.is_benign())
    }

    pub fn recovery_hint(&self) -> &'static str {
        match self {
            Self::Config(e) | Self::Control(ControlError::Config(e)) => config_hint(e),
            Self::Control(e) => e.recovery_hint(),
            Self::Logger { .. } => "Check the [logging] section of config.toml.",
        }
    }
}

fn config_hint(e: &ConfigError) -> &'static str {
    match e {
        ConfigError::Missing { key, .. } if key == KEY_PORT => {
            "No server port is recorded. Launch the server with `run-server` first."
        }
        ConfigError::Missing { .. } | ConfigError::Invalid { .. } => {
            "Run `init` to restore defaults or fix the value with `var set`."
        }
        ConfigError::Toml { .. } | ConfigError::TomlWrite { .. } => {
            "Fix or remove the offending TOML file in the config directory."
        }
        ConfigError::NoHomeDir => "Pass --config-dir or set WP_CONFIG_DIR.",
        _ => "Check config.toml and the WP_* environment variables.",
    }
}

pub type Result<T> = std::result::Result<T, CliError>;
