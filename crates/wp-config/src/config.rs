use crate::{
    CONFIG_DIR_ENV, CONFIG_DIR_NAME, CONFIG_FILENAME, ConfigError, ConfigErrorResult,
    ControlConfig, LoggingConfig, VARS_FILENAME, WallpaperConfig, WallpaperDefaults, parse_bool,
};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub control: ControlConfig,
    /// Per-feature values keyed by feature name
    pub wallpaper: BTreeMap<String, WallpaperConfig>,
}

impl Config {
    /// Load config from the default config directory.
    ///
    /// Loading order:
    /// 1. WP_CONFIG_DIR env var, else `<user config dir>/wp`
    /// 2. Auto-create the config directory if it doesn't exist
    /// 3. Load config.toml if it exists, else use defaults
    /// 4. Apply WP_* environment variable overrides
    ///
    /// Does NOT validate - call validate() after load().
    pub fn load() -> ConfigErrorResult<Self> {
        let config_dir = Self::config_dir()?;
        Self::load_from(&config_dir)
    }

    /// Load config from an explicit directory.
    pub fn load_from(config_dir: &Path) -> ConfigErrorResult<Self> {
        if !config_dir.exists() {
            std::fs::create_dir_all(config_dir).map_err(|e| ConfigError::Io {
                path: config_dir.to_path_buf(),
                source: e,
            })?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);

        let mut config = if config_path.exists() {
            Self::load_toml(&config_path)?
        } else {
            Config::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    fn load_toml(path: &Path) -> ConfigErrorResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::Toml {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the config directory.
    /// Priority: WP_CONFIG_DIR env var > `<user config dir>/wp`
    pub fn config_dir() -> ConfigErrorResult<PathBuf> {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_DIR_NAME))
            .ok_or(ConfigError::NoHomeDir)
    }

    /// Path of the key/value store inside a config directory.
    pub fn vars_path(config_dir: &Path) -> PathBuf {
        config_dir.join(VARS_FILENAME)
    }

    /// Absolute path of the log file, if file logging is configured.
    pub fn log_file_path(&self, config_dir: &Path) -> Option<PathBuf> {
        self.logging
            .file
            .as_ref()
            .map(|file| config_dir.join(&self.logging.dir).join(file))
    }

    /// Validate all configuration.
    /// Call after load() to catch all errors at startup.
    pub fn validate(&self) -> ConfigErrorResult<()> {
        self.control.validate()?;

        for (feature, wallpaper) in &self.wallpaper {
            wallpaper.validate(feature)?;
        }

        if let Some(ref file) = self.logging.file
            && (Path::new(file).is_absolute() || file.contains(".."))
        {
            return Err(ConfigError::config(
                "logging.file must be relative and cannot contain '..'",
            ));
        }

        Ok(())
    }

    /// Built-in `defaults` overlaid with the feature's `[wallpaper.<name>]`
    /// table, if there is one.
    pub fn wallpaper_defaults(
        &self,
        defaults: &WallpaperDefaults,
    ) -> ConfigErrorResult<WallpaperDefaults> {
        match self.wallpaper.get(defaults.name) {
            Some(wallpaper) => wallpaper.apply(defaults),
            None => Ok(defaults.clone()),
        }
    }

    /// Log configuration summary.
    pub fn log_summary(&self) {
        info!("Configuration loaded:");
        info!(
            "  control: {} (timeout {}ms, stop grace {}ms)",
            self.control.host, self.control.request_timeout_ms, self.control.stop_grace_ms
        );
        info!("  lock dir: {}", self.control.lock_dir().display());
        info!(
            "  logging: {} (colored: {}, file: {})",
            *self.logging.level,
            self.logging.colored,
            self.logging.file.as_deref().unwrap_or("-")
        );
        for feature in self.wallpaper.keys() {
            info!("  wallpaper: [{feature}] overrides configured");
        }
    }

    fn apply_env_overrides(&mut self) {
        // Logging
        Self::apply_env_parse("WP_LOG_LEVEL", &mut self.logging.level);
        Self::apply_env_bool("WP_LOG_COLORED", &mut self.logging.colored);
        Self::apply_env_option_string("WP_LOG_FILE", &mut self.logging.file);

        // Control
        Self::apply_env_string("WP_CONTROL_HOST", &mut self.control.host);
        Self::apply_env_parse(
            "WP_CONTROL_TIMEOUT_MS",
            &mut self.control.request_timeout_ms,
        );
        Self::apply_env_parse("WP_STOP_GRACE_MS", &mut self.control.stop_grace_ms);
        Self::apply_env_option_string("WP_LOCK_DIR", &mut self.control.lock_dir);
    }

    fn apply_env_string(var_name: &str, target: &mut String) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val;
        }
    }

    /// Same boolean grammar as the stored variables; junk is ignored.
    fn apply_env_bool(var_name: &str, target: &mut bool) {
        if let Ok(val) = std::env::var(var_name) {
            match parse_bool(var_name, &val) {
                Ok(parsed) => *target = parsed,
                Err(e) => warn!("Ignoring {var_name}: {e}"),
            }
        }
    }

    fn apply_env_parse<T: std::str::FromStr>(var_name: &str, target: &mut T) {
        let Ok(val) = std::env::var(var_name) else {
            return;
        };
        match val.trim().parse() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!("Ignoring {var_name}: cannot parse '{val}'"),
        }
    }

    /// An empty value clears the setting.
    fn apply_env_option_string(var_name: &str, target: &mut Option<String>) {
        if let Ok(val) = std::env::var(var_name) {
            *target = (!val.is_empty()).then_some(val);
        }
    }
}
