//! wp - background wallpaper supervisor CLI
//!
//! ```bash
//! wp live-wallpaper init
//! wp live-wallpaper run-server &
//! wp live-wallpaper stop
//! ```

pub(crate) mod cli;
pub(crate) mod commands;
pub(crate) mod error;
pub mod logger;
pub(crate) mod runner;
pub(crate) mod var_commands;
pub(crate) mod wallpaper_commands;


pub use cli::Cli;
pub use error::{CliError, Result as CliResult};
pub use runner::{Context, run};
