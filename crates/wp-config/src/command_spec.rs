use crate::{ConfigError, ConfigErrorResult};

use std::fmt;

/// Program path followed by its arguments, passed to the OS verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    argv: Vec<String>,
}

impl CommandSpec {
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut argv = vec![program.to_string()];
        argv.extend(args.into_iter().map(Into::into));
        Self { argv }
    }

    /// Parse a JSON array of strings, e.g. `["mpv", "--loop", "video.mp4"]`.
    #[track_caller]
    pub fn from_json(key: &str, raw: &str) -> ConfigErrorResult<Self> {
        let argv: Vec<String> = serde_json::from_str(raw)
            .map_err(|e| ConfigError::invalid(key, format!("expected JSON string array: {e}")))?;

        Self::from_argv(key, argv)
    }

    /// Program followed by its arguments; the program must not be blank.
    #[track_caller]
    pub fn from_argv(key: &str, argv: Vec<String>) -> ConfigErrorResult<Self> {
        match argv.first() {
            None => Err(ConfigError::invalid(key, "command must not be empty")),
            Some(program) if program.trim().is_empty() => {
                Err(ConfigError::invalid(key, "program path must not be blank"))
            }
            Some(_) => Ok(Self { argv }),
        }
    }

    pub fn to_json(&self) -> String {
        // A Vec<String> always serializes.
        serde_json::to_string(&self.argv).unwrap_or_else(|_| String::from("[]"))
    }

    pub fn program(&self) -> &str {
        &self.argv[0]
    }

    pub fn args(&self) -> &[String] {
        &self.argv[1..]
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.argv.join(" "))
    }
}
