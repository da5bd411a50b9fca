use crate::DEFAULT_LOG_LEVEL;

use std::ops::Deref;
use std::str::FromStr;

use log::LevelFilter;
use serde::{Deserialize, Deserializer};

/// `LevelFilter` that never fails to load: unknown names and non-string
/// values fall back to the default level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogLevel(pub LevelFilter);

impl LogLevel {
    pub fn parse_lenient(s: &str) -> Self {
        Self(s.trim().parse().unwrap_or(DEFAULT_LOG_LEVEL))
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        Self(DEFAULT_LOG_LEVEL)
    }
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match toml::Value::deserialize(deserializer) {
            Ok(toml::Value::String(name)) => Self::parse_lenient(&name),
            _ => Self::default(),
        })
    }
}

impl Deref for LogLevel {
    type Target = LevelFilter;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromStr for LogLevel {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse_lenient(s))
    }
}
