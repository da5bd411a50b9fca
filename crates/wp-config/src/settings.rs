//! Typed loading of the keys the supervisor and clients need.

use crate::{
    CommandSpec, ConfigError, ConfigErrorResult, ConfigStore, KEY_COMMAND, KEY_PORT,
    KEY_SINGLE_INSTANCE, KEY_START_NOW, WallpaperDefaults,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisorSettings {
    pub command: CommandSpec,
    pub start_now: bool,
    pub single_instance: bool,
}

impl SupervisorSettings {
    /// Read `command`, `startNow` and `singleInstance`, falling back to
    /// `defaults` for keys that were never set.
    pub fn load<S: ConfigStore + ?Sized>(
        store: &S,
        defaults: &WallpaperDefaults,
    ) -> ConfigErrorResult<Self> {
        let command = match store.get(KEY_COMMAND)? {
            Some(raw) => CommandSpec::from_json(KEY_COMMAND, &raw)?,
            None => defaults.command.clone(),
        };

        let start_now = match store.get(KEY_START_NOW)? {
            Some(raw) => parse_bool(KEY_START_NOW, &raw)?,
            None => defaults.start_now,
        };

        let single_instance = match store.get(KEY_SINGLE_INSTANCE)? {
            Some(raw) => parse_bool(KEY_SINGLE_INSTANCE, &raw)?,
            None => defaults.single_instance,
        };

        Ok(Self {
            command,
            start_now,
            single_instance,
        })
    }
}

/// Port persisted by the last `run-server`.
pub fn load_port<S: ConfigStore + ?Sized>(store: &S) -> ConfigErrorResult<u16> {
    let raw = store
        .get(KEY_PORT)?
        .ok_or_else(|| ConfigError::missing(KEY_PORT))?;

    match raw.trim().parse::<u16>() {
        Ok(0) => Err(ConfigError::invalid(KEY_PORT, "port 0 is not connectable")),
        Ok(port) => Ok(port),
        Err(e) => Err(ConfigError::invalid(KEY_PORT, format!("'{raw}': {e}"))),
    }
}

pub fn store_port<S: ConfigStore + ?Sized>(store: &S, port: u16) -> ConfigErrorResult<()> {
    store.set(KEY_PORT, &port.to_string())
}

/// Boolean grammar: 1 t T TRUE true True / 0 f F FALSE false False.
#[track_caller]
pub fn parse_bool(key: &str, raw: &str) -> ConfigErrorResult<bool> {
    match raw.trim() {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        other => Err(ConfigError::invalid(
            key,
            format!("'{other}' is not a boolean"),
        )),
    }
}
