use std::panic::Location;
use std::path::PathBuf;
use std::result::Result as StdResult;

use error_location::ErrorLocation;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum ConfigError {
    #[error("{category} error: {message} {location}")]
    Generic {
        category: &'static str,
        message: String,
        location: ErrorLocation,
    },

    #[error("Required key '{key}' is not set {location}")]
    Missing {
        key: String,
        location: ErrorLocation,
    },

    #[error("Invalid value for '{key}': {message} {location}")]
    Invalid {
        key: String,
        message: String,
        location: ErrorLocation,
    },

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error in {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("TOML serialize error for {path}: {source}")]
    TomlWrite {
        path: PathBuf,
        #[source]
        source: toml::ser::Error,
    },

    #[error("Home directory not found")]
    NoHomeDir,
}

impl ConfigError {
    /// Create a config error
    #[track_caller]
    pub fn config<S: Into<String>>(message: S) -> Self {
        ConfigError::Generic {
            category: "Config",
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Create a control error
    #[track_caller]
    pub fn control<S: Into<String>>(message: S) -> Self {
        ConfigError::Generic {
            category: "Control",
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Create a store error
    #[track_caller]
    pub fn store<S: Into<String>>(message: S) -> Self {
        ConfigError::Generic {
            category: "Store",
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// A required key is absent from the store
    #[track_caller]
    pub fn missing<S: Into<String>>(key: S) -> Self {
        ConfigError::Missing {
            key: key.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// A key is present but cannot be parsed
    #[track_caller]
    pub fn invalid<K: Into<String>, M: Into<String>>(key: K, message: M) -> Self {
        ConfigError::Invalid {
            key: key.into(),
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type ConfigErrorResult<T> = StdResult<T, ConfigError>;
