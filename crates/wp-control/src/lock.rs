//! Advisory lock file for single-instance enforcement.
//!
//! The lock is an `flock` held for the life of the process, so a crashed
//! holder never leaves a stale lock behind. The file itself stays on disk
//! and records who holds it.

use crate::{ControlError, ControlResult};

use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::panic::Location;
use std::path::{Path, PathBuf};

use error_location::ErrorLocation;
use fs2::FileExt;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

const LOCK_EXTENSION: &str = "lock";
const LOCK_FILE_MODE: u32 = 0o600; // Owner read/write only

#[derive(Debug, Serialize, Deserialize)]
struct LockInfo {
    pid: u32,
    started_at: String,
}

#[derive(Debug)]
pub struct InstanceLock {
    path: PathBuf,
    file: Option<File>,
}

impl InstanceLock {
    /// Take the lock `<lock_dir>/<name>.lock`.
    ///
    /// Fails with [`ControlError::AlreadyRunning`] while another process holds it.
    pub fn acquire(lock_dir: &Path, name: &str) -> ControlResult<Self> {
        let path = Self::lock_path(lock_dir, name);
        let lock_error = |source: std::io::Error| ControlError::LockAcquisition {
            path: path.clone(),
            source,
            location: ErrorLocation::from(Location::caller()),
        };

        std::fs::create_dir_all(lock_dir).map_err(lock_error)?;

        // No truncate: the holder's record must survive a failed attempt.
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .mode(LOCK_FILE_MODE)
            .open(&path)
            .map_err(lock_error)?;

        if let Err(e) = file.try_lock_exclusive() {
            if Self::is_contended(&e) {
                match Self::holder_pid(&path) {
                    Some(pid) => info!("Lock {} is held by process {pid}", path.display()),
                    None => info!("Lock {} is held by another process", path.display()),
                }
                return Err(ControlError::AlreadyRunning {
                    name: name.to_string(),
                    path,
                    location: ErrorLocation::from(Location::caller()),
                });
            }
            return Err(lock_error(e));
        }

        let mut lock = Self {
            path,
            file: Some(file),
        };
        lock.write_info()?;

        debug!("Acquired instance lock {}", lock.path.display());
        Ok(lock)
    }

    /// Like [`acquire`](Self::acquire), but contention is `Ok(None)`.
    pub fn try_acquire(lock_dir: &Path, name: &str) -> ControlResult<Option<Self>> {
        match Self::acquire(lock_dir, name) {
            Ok(lock) => Ok(Some(lock)),
            Err(ControlError::AlreadyRunning { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn lock_path(lock_dir: &Path, name: &str) -> PathBuf {
        lock_dir.join(format!("{name}.{LOCK_EXTENSION}"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// PID recorded in a lock file, if readable.
    pub fn holder_pid(path: &Path) -> Option<u32> {
        let content = std::fs::read_to_string(path).ok()?;
        serde_json::from_str::<LockInfo>(&content)
            .ok()
            .map(|info| info.pid)
    }

    /// Release the lock. Called on drop.
    pub fn release(&mut self) {
        if let Some(file) = self.file.take() {
            if let Err(e) = FileExt::unlock(&file) {
                warn!("Failed to unlock {}: {e}", self.path.display());
            }
            debug!("Released instance lock {}", self.path.display());
        }
    }

    fn write_info(&mut self) -> ControlResult<()> {
        let info = LockInfo {
            pid: std::process::id(),
            started_at: chrono::Utc::now().to_rfc3339(),
        };

        let content = serde_json::to_string_pretty(&info)
            .map_err(|e| ControlError::from(std::io::Error::other(e)))?;

        if let Some(ref mut file) = self.file {
            file.set_len(0)?;
            file.seek(SeekFrom::Start(0))?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
        }

        Ok(())
    }

    fn is_contended(e: &std::io::Error) -> bool {
        e.kind() == std::io::ErrorKind::WouldBlock
            || e.raw_os_error() == fs2::lock_contended_error().raw_os_error()
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        self.release();
    }
}
