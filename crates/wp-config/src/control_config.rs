use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_HOST, DEFAULT_REQUEST_TIMEOUT_MS, DEFAULT_STOP_GRACE_MS,
};

use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Settings shared by the control server and its clients.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Loopback address the control channel binds to and dials
    pub host: String,
    /// Per-connection read/response timeout
    pub request_timeout_ms: u64,
    /// Time the child group gets between SIGTERM and SIGKILL
    pub stop_grace_ms: u64,
    /// Directory for single-instance lock files
    pub lock_dir: Option<String>,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            host: String::from(DEFAULT_HOST),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            stop_grace_ms: DEFAULT_STOP_GRACE_MS,
            lock_dir: None,
        }
    }
}

impl ControlConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        let ip: IpAddr = self.host.parse().map_err(|_| {
            ConfigError::control(format!("host '{}' is not an IP address", self.host))
        })?;

        if !ip.is_loopback() {
            return Err(ConfigError::control(format!(
                "host '{}' must be a loopback address",
                self.host
            )));
        }

        if self.request_timeout_ms == 0 {
            return Err(ConfigError::control("request_timeout_ms must be > 0"));
        }

        if self.stop_grace_ms == 0 {
            return Err(ConfigError::control("stop_grace_ms must be > 0"));
        }

        // A stop reply is only sent once the child group is gone.
        if self.request_timeout_ms <= self.stop_grace_ms {
            return Err(ConfigError::control(format!(
                "request_timeout_ms ({}) must exceed stop_grace_ms ({})",
                self.request_timeout_ms, self.stop_grace_ms
            )));
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn stop_grace(&self) -> Duration {
        Duration::from_millis(self.stop_grace_ms)
    }

    /// Lock directory: configured value, else the XDG runtime dir, else the temp dir.
    pub fn lock_dir(&self) -> PathBuf {
        match self.lock_dir {
            Some(ref dir) => PathBuf::from(dir),
            None => dirs::runtime_dir().unwrap_or_else(std::env::temp_dir),
        }
    }
}
