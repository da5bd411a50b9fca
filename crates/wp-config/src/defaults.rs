//! Built-in defaults for each wallpaper feature.

use crate::{CommandSpec, KEY_COMMAND, KEY_SINGLE_INSTANCE, KEY_START_NOW};

use std::path::PathBuf;

const DYNAMIC_WALLPAPER: &str = "dynamic-wallpaper";
const LIVE_WALLPAPER: &str = "live-wallpaper";
const LIVE_WALLPAPER_LOCK: &str = "live-wallpaper-server";
const DYNAMIC_WALLPAPER_LOCK: &str = "dynamic-wallpaper-server";

const WALLPAPER_DIR: &str = ".wallpapers";
const WALLPAPER_FILE: &str = "live.mp4";
const MPV_IPC_SOCKET: &str = "--input-ipc-server=/tmp/mpv-bg-socket";

/// Immutable per-feature defaults handed to the supervisor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WallpaperDefaults {
    /// Feature name; also the store namespace
    pub name: &'static str,
    /// Name of the single-instance lock
    pub lock_name: &'static str,
    pub command: CommandSpec,
    pub start_now: bool,
    pub single_instance: bool,
}

impl WallpaperDefaults {
    /// Defaults for `dynamic-wallpaper`. No single-instance guard unless enabled.
    pub fn dynamic_wallpaper() -> Self {
        Self {
            name: DYNAMIC_WALLPAPER,
            lock_name: DYNAMIC_WALLPAPER_LOCK,
            command: Self::video_wallpaper_command(),
            start_now: true,
            single_instance: false,
        }
    }

    /// Defaults for `live-wallpaper`. Guarded by a single-instance lock.
    pub fn live_wallpaper() -> Self {
        Self {
            name: LIVE_WALLPAPER,
            lock_name: LIVE_WALLPAPER_LOCK,
            command: Self::video_wallpaper_command(),
            start_now: true,
            single_instance: true,
        }
    }

    /// Default value of every key `init` resets.
    pub fn default_values(&self) -> Vec<(&'static str, String)> {
        vec![
            (KEY_COMMAND, self.command.to_json()),
            (KEY_START_NOW, self.start_now.to_string()),
            (KEY_SINGLE_INSTANCE, self.single_instance.to_string()),
        ]
    }

    /// xwinwrap hosting a looping mpv on the desktop window.
    fn video_wallpaper_command() -> CommandSpec {
        let video = dirs::home_dir()
            .map(|home| home.join(WALLPAPER_DIR).join(WALLPAPER_FILE))
            .unwrap_or_else(|| PathBuf::from(WALLPAPER_FILE));

        CommandSpec::new(
            "xwinwrap",
            [
                "-ni",
                "-fdt",
                "-sh",
                "rectangle",
                "-un",
                "-b",
                "-nf",
                "-ov",
                "-fs",
                "--",
                "mpv",
                "-wid",
                "WID",
                "--no-config",
                "--keepaspect=no",
                "--loop",
                "--no-border",
                "--vd-lavc-fast",
                "--x11-bypass-compositor=no",
                "--gapless-audio=yes",
                "--aid=no",
                "--vo=xv",
                "--hwdec=auto",
                "--really-quiet",
                MPV_IPC_SOCKET,
            ]
            .into_iter()
            .map(String::from)
            .chain(std::iter::once(video.display().to_string())),
        )
    }
}
