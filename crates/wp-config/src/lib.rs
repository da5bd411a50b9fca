mod command_spec;
mod config;
mod control_config;
mod defaults;
mod error;
mod log_level;
mod logging_config;
mod settings;
mod store;
mod wallpaper_config;

#[cfg(test)]
mod tests;

pub use command_spec::CommandSpec;
pub use config::Config;
pub use control_config::ControlConfig;
pub use defaults::WallpaperDefaults;
pub use error::{ConfigError, ConfigErrorResult};
pub use log_level::LogLevel;
pub use logging_config::LoggingConfig;
pub use settings::{SupervisorSettings, load_port, parse_bool, store_port};
pub use store::{ConfigStore, FileStore, MemoryStore};
pub use wallpaper_config::WallpaperConfig;

/// Store keys read and written by the wallpaper supervisor.
pub const KEY_COMMAND: &str = "command";
pub const KEY_START_NOW: &str = "startNow";
pub const KEY_SINGLE_INSTANCE: &str = "singleInstance";
pub const KEY_PORT: &str = "port";

const CONFIG_DIR_ENV: &str = "WP_CONFIG_DIR";
const CONFIG_DIR_NAME: &str = "wp";
const CONFIG_FILENAME: &str = "config.toml";
const VARS_FILENAME: &str = "vars.toml";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_STOP_GRACE_MS: u64 = 2_000;
const DEFAULT_LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;
const DEFAULT_LOG_DIRECTORY: &str = "logs";
const DEFAULT_LOG_COLORED: bool = true;
