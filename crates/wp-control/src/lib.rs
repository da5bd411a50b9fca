//! Supervision of one long-lived wallpaper renderer behind a local
//! TCP control channel.
//!
//! A [`Supervisor`] owns a [`ControlServer`], which owns the renderer's
//! [`ChildProcess`]. Later CLI invocations find the server through the
//! persisted `port` key and talk to it with a [`ControlClient`].

#[cfg(not(unix))]
compile_error!("wp-control supports Unix platforms only");

mod child;
mod client;
mod error;
mod lock;
mod protocol;
mod server;
mod signal;
mod supervisor;

#[cfg(test)]
mod tests;

pub use child::{ChildProcess, ChildState};
pub use client::ControlClient;
pub use error::{ControlError, Result as ControlResult};
pub use lock::InstanceLock;
pub use protocol::{MAX_LINE_LEN, Request, Response, read_message, write_message};
pub use server::ControlServer;
pub use signal::shutdown_signal;
pub use supervisor::Supervisor;
