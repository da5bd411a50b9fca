use crate::{CommandSpec, ConfigErrorResult, KEY_COMMAND, WallpaperDefaults};

use serde::Deserialize;

/// One `[wallpaper.<feature>]` table. Values set here take precedence over
/// the built-in defaults when `init` resets the store, and when the
/// supervisor falls back for keys that were never stored.
///
/// ```toml
/// [wallpaper.live-wallpaper]
/// command = ["mpv", "--loop", "/srv/video.mp4"]
/// startNow = false
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WallpaperConfig {
    /// Program followed by its arguments
    pub command: Option<Vec<String>>,
    pub start_now: Option<bool>,
    pub single_instance: Option<bool>,
}

impl WallpaperConfig {
    pub fn validate(&self, feature: &str) -> ConfigErrorResult<()> {
        self.command_spec(feature).map(|_| ())
    }

    /// `defaults` with every value configured here swapped in.
    pub fn apply(&self, defaults: &WallpaperDefaults) -> ConfigErrorResult<WallpaperDefaults> {
        let mut merged = defaults.clone();

        if let Some(command) = self.command_spec(defaults.name)? {
            merged.command = command;
        }
        if let Some(start_now) = self.start_now {
            merged.start_now = start_now;
        }
        if let Some(single_instance) = self.single_instance {
            merged.single_instance = single_instance;
        }

        Ok(merged)
    }

    fn command_spec(&self, feature: &str) -> ConfigErrorResult<Option<CommandSpec>> {
        let key = format!("wallpaper.{feature}.{KEY_COMMAND}");
        self.command
            .clone()
            .map(|argv| CommandSpec::from_argv(&key, argv))
            .transpose()
    }
}
