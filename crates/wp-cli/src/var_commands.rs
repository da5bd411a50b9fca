use clap::Subcommand;

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub(crate) enum VarCommands {
    /// List all variables
    List,
    /// Print one variable
    Get {
        /// Variable name, e.g. startNow
        key: String,
    },
    /// Set one variable
    Set {
        key: String,
        /// For `command`, a JSON array: '["mpv", "--loop", "video.mp4"]'
        value: String,
    },
}
