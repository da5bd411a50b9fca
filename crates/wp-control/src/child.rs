//! The renderer process owned by the control server.
//!
//! The child runs as the leader of its own process group so that stopping
//! it also reaches whatever helpers it forked (xwinwrap forks mpv, for one).

use crate::{ControlError, ControlResult};

use std::fmt;
use std::os::unix::process::CommandExt;
use std::panic::Location;
use std::process::{Child, Command, Stdio};
use std::str::FromStr;
use std::time::Duration;

use error_location::ErrorLocation;
use log::{debug, info, warn};
use nix::errno::Errno;
use nix::sys::signal::{Signal, killpg};
use nix::unistd::Pid;
use tokio::time::{Instant, sleep};
use wp_config::CommandSpec;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildState {
    NotStarted,
    Running,
    Stopped,
}

impl ChildState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not-started",
            Self::Running => "running",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for ChildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChildState {
    type Err = ControlError;

    #[track_caller]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not-started" => Ok(Self::NotStarted),
            "running" => Ok(Self::Running),
            "stopped" => Ok(Self::Stopped),
            other => Err(ControlError::protocol(format!("unknown child state '{other}'"))),
        }
    }
}

/// Zero-or-one live renderer process built from a [`CommandSpec`].
pub struct ChildProcess {
    command: CommandSpec,
    stop_grace: Duration,
    child: Option<Child>,
    /// Group of the most recent launch. Outlives `child` when the leader
    /// exits on its own but its helpers keep running.
    pgid: Option<Pid>,
    state: ChildState,
}

impl ChildProcess {
    pub fn new(command: CommandSpec, stop_grace: Duration) -> Self {
        Self {
            command,
            stop_grace,
            child: None,
            pgid: None,
            state: ChildState::NotStarted,
        }
    }

    pub fn command(&self) -> &CommandSpec {
        &self.command
    }

    /// PID of the live leader, if any.
    pub fn pid(&self) -> Option<u32> {
        self.child.as_ref().map(Child::id)
    }

    /// Current state, noticing a leader that exited by itself.
    pub fn state(&mut self) -> ChildState {
        if let Some(ref mut child) = self.child {
            match child.try_wait() {
                Ok(Some(status)) => {
                    warn!("Wallpaper process {} exited on its own: {status}", child.id());
                    self.child = None;
                    self.state = ChildState::Stopped;
                }
                Ok(None) => {}
                Err(e) => warn!("Failed to poll wallpaper process {}: {e}", child.id()),
            }
        }
        self.state
    }

    /// Launch the command. No-op while already running.
    pub async fn start(&mut self) -> ControlResult<()> {
        if self.state() == ChildState::Running {
            debug!("Wallpaper process already running, ignoring start");
            return Ok(());
        }

        // Leftover helpers from a leader that died on its own.
        if self.pgid.is_some() {
            self.stop().await?;
        }

        let mut cmd = Command::new(self.command.program());
        cmd.args(self.command.args())
            .stdin(Stdio::null())
            .process_group(0);

        // Linux: a SIGKILLed supervisor still takes the renderer down.
        #[cfg(target_os = "linux")]
        unsafe {
            cmd.pre_exec(|| {
                if libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGKILL as libc::c_ulong) == -1 {
                    return Err(std::io::Error::last_os_error());
                }
                Ok(())
            });
        }

        let child = cmd.spawn().map_err(|e| ControlError::Launch {
            program: self.command.program().to_string(),
            source: e,
            location: ErrorLocation::from(Location::caller()),
        })?;

        let raw_pid = child.id();
        let pgid = i32::try_from(raw_pid).map(Pid::from_raw).map_err(|_| {
            ControlError::from(std::io::Error::other(format!(
                "process id {raw_pid} is out of range"
            )))
        })?;

        info!("Started wallpaper process {raw_pid}: {}", self.command);

        self.child = Some(child);
        self.pgid = Some(pgid);
        self.state = ChildState::Running;

        Ok(())
    }

    /// Terminate the whole process group. No-op unless something was started.
    ///
    /// The group is gone when this returns, even on error: a failed graceful
    /// stop falls back to SIGKILL.
    pub async fn stop(&mut self) -> ControlResult<()> {
        let Some(pgid) = self.pgid else {
            debug!("No wallpaper process to stop");
            return Ok(());
        };

        let result = self.terminate_group(pgid).await;
        if let Err(ref e) = result {
            warn!("Graceful stop of process group {pgid} failed: {e}, sending SIGKILL");
            self.kill_group();
        }
        self.pgid = None;
        self.state = ChildState::Stopped;

        result?;
        info!("Stopped wallpaper process group {pgid}");
        Ok(())
    }

    /// SIGTERM the group, give it `stop_grace` to exit, then SIGKILL what is
    /// left. The owned leader is reaped along the way.
    async fn terminate_group(&mut self, pgid: Pid) -> ControlResult<()> {
        Self::signal_group(pgid, Signal::SIGTERM)?;

        let deadline = Instant::now() + self.stop_grace;
        loop {
            self.reap_leader()?;

            if self.child.is_none() && !Self::group_exists(pgid) {
                return Ok(());
            }

            if Instant::now() >= deadline {
                break;
            }

            sleep(POLL_INTERVAL).await;
        }

        warn!(
            "Process group {pgid} still alive after {:?}, sending SIGKILL",
            self.stop_grace
        );
        Self::signal_group(pgid, Signal::SIGKILL)?;

        while self.child.is_some() {
            sleep(POLL_INTERVAL).await;
            self.reap_leader()?;
        }

        Ok(())
    }

    /// Drop the leader handle once it has exited.
    fn reap_leader(&mut self) -> ControlResult<()> {
        let exited = match self.child.as_mut() {
            Some(child) => child.try_wait()?.is_some(),
            None => false,
        };
        if exited {
            self.child = None;
        }
        Ok(())
    }

    /// SIGKILL whatever is left of the group and forget it.
    fn kill_group(&mut self) {
        if let Some(pgid) = self.pgid.take() {
            killpg(pgid, Signal::SIGKILL).ok();
        }
        if let Some(mut child) = self.child.take() {
            child.wait().ok();
        }
    }

    fn signal_group(pgid: Pid, signal: Signal) -> ControlResult<()> {
        match killpg(pgid, signal) {
            Ok(()) | Err(Errno::ESRCH) => Ok(()),
            Err(source) => Err(ControlError::Signal {
                pgid: pgid.as_raw(),
                source,
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }

    fn group_exists(pgid: Pid) -> bool {
        // Signal 0: existence check only.
        !matches!(killpg(pgid, None), Err(Errno::ESRCH))
    }
}

impl Drop for ChildProcess {
    fn drop(&mut self) {
        self.kill_group();
    }
}
