use crate::wallpaper_commands::WallpaperCommands;

use clap::Subcommand;
use wp_config::WallpaperDefaults;

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Video wallpaper without a single-instance guard by default
    DynamicWallpaper {
        #[command(subcommand)]
        action: WallpaperCommands,
    },

    /// Video wallpaper guarded by a single-instance lock
    LiveWallpaper {
        #[command(subcommand)]
        action: WallpaperCommands,
    },
}

impl Commands {
    /// Feature defaults and the action to run against them.
    pub(crate) fn into_parts(self) -> (WallpaperDefaults, WallpaperCommands) {
        match self {
            Self::DynamicWallpaper { action } => (WallpaperDefaults::dynamic_wallpaper(), action),
            Self::LiveWallpaper { action } => (WallpaperDefaults::live_wallpaper(), action),
        }
    }
}
