use crate::commands::Commands;

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "wp")]
#[command(about = "Run and control wallpaper renderers in the background")]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub(crate) command: Commands,

    /// Config directory (default: $WP_CONFIG_DIR, else <user config dir>/wp)
    #[arg(long, global = true, value_name = "DIR")]
    pub(crate) config_dir: Option<PathBuf>,
}
