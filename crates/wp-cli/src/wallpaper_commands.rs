use crate::var_commands::VarCommands;

use clap::Subcommand;

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub(crate) enum WallpaperCommands {
    /// Reset command, startNow and singleInstance to their defaults,
    /// preferring values from the [wallpaper.<feature>] table of config.toml
    Init,
    /// Launch the control server; blocks until stopped
    RunServer,
    /// Start the wallpaper in the running server
    #[command(visible_alias = "show")]
    Start,
    /// Stop the wallpaper and shut the server down
    #[command(visible_alias = "kill")]
    Stop,
    /// Print the wallpaper state: not-started, running or stopped
    Status,
    /// Inspect or edit stored variables
    Var {
        #[command(subcommand)]
        action: VarCommands,
    },
    /// Shorthand for `var set command <value>`
    #[command(name = "command")]
    SetCommand {
        /// JSON array: '["mpv", "--loop", "video.mp4"]'
        value: String,
    },
    /// Shorthand for `var set startNow <value>`
    #[command(name = "startNow")]
    SetStartNow { value: String },
    /// Shorthand for `var set singleInstance <value>`
    #[command(name = "singleInstance")]
    SetSingleInstance { value: String },
}
