use std::panic::Location;
use std::path::PathBuf;

use error_location::ErrorLocation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ControlError {
    #[error("Config error: {0}")]
    Config(#[from] wp_config::ConfigError),

    #[error("Failed to bind control listener on {host}: {source} {location}")]
    Bind {
        host: String,
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("Failed to launch '{program}': {source} {location}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("Failed to signal process group {pgid}: {source} {location}")]
    Signal {
        pgid: i32,
        #[source]
        source: nix::errno::Errno,
        location: ErrorLocation,
    },

    #[error("Connection refused on port {port} {location}")]
    ConnectionRefused { port: u16, location: ErrorLocation },

    #[error("No response from port {port} within {timeout_ms}ms {location}")]
    Timeout {
        port: u16,
        timeout_ms: u128,
        location: ErrorLocation,
    },

    #[error("Protocol error: {message} {location}")]
    Protocol {
        message: String,
        location: ErrorLocation,
    },

    #[error("Server rejected request: {message} {location}")]
    Remote {
        message: String,
        location: ErrorLocation,
    },

    #[error("A '{name}' server instance is already running (lock file: {path})")]
    AlreadyRunning {
        name: String,
        path: PathBuf,
        location: ErrorLocation,
    },

    #[error("Failed to acquire lock at {path}: {source} {location}")]
    LockAcquisition {
        path: PathBuf,
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("IO error: {source} {location}")]
    Io {
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },
}

impl ControlError {
    /// Create a protocol error with location
    #[track_caller]
    pub fn protocol<S: Into<String>>(message: S) -> Self {
        Self::Protocol {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Create a remote error with location
    #[track_caller]
    pub fn remote<S: Into<String>>(message: S) -> Self {
        Self::Remote {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Expected outcomes that should not fail the invocation.
    pub fn is_benign(&self) -> bool {
        matches!(self, Self::AlreadyRunning { .. })
    }

    pub fn recovery_hint(&self) -> &'static str {
        match self {
            Self::ConnectionRefused { .. } => {
                "The wallpaper server is not running (the recorded port is stale). \
                   Launch it with `run-server`; there is nothing to stop."
            }
            Self::Timeout { .. } => {
                "The server did not answer in time. \
                   Check that the recorded port belongs to a wallpaper server."
            }
            Self::Protocol { .. } => {
                "The recorded port answered with something unexpected. \
                   Another program may have taken it over; restart the server."
            }
            Self::Launch { .. } => {
                "The wallpaper command could not be started. \
                   Check the `command` variable points at an installed program."
            }
            Self::Remote { .. } => "The server refused the request. Check the server log.",
            Self::Bind { .. } => {
                "No local port could be bound. Check the `control.host` setting."
            }
            Self::AlreadyRunning { .. } => "Use `start` or `stop` to control it.",
            Self::LockAcquisition { .. } => {
                "Unable to create the lock file. \
                   Check permissions of the lock directory."
            }
            Self::Config(_) => {
                "A configuration value is missing or invalid. \
                   Run `init` to restore defaults or fix it with `var set`."
            }
            _ => "An unexpected error occurred. Please check the logs for details.",
        }
    }
}

impl From<std::io::Error> for ControlError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ControlError>;
