//! Cross-process writer lock for the file backend.
//!
//! The lock is a file created with `create_new` and stamped with the owner's
//! pid. A lock whose owner is no longer running is treated as stale and
//! removed. The file is deleted when the guard drops.

use std::fs::OpenOptions;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::error::StoreError;

const LOCK_RETRY_DELAY: Duration = Duration::from_millis(20);

/// File name of the writer lock inside a store directory.
pub const LOCK_FILE_NAME: &str = "store.write.lock";

/// Held writer lock. Dropping it releases the lock.
#[derive(Debug)]
pub struct LockFileGuard {
    path: PathBuf,
}

impl LockFileGuard {
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockFileGuard {
    fn drop(&mut self) {
        if let Err(error) = std::fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), %error, "failed to release store lock");
        }
    }
}

/// Block until the lock at `lock_path` is acquired or `timeout` elapses.
///
/// # Errors
///
/// `StoreError::LockTimeout` when another live process keeps the lock (or the
/// lock file stays unreadable) for longer than `timeout`.
pub fn acquire(lock_path: &Path, timeout: Duration) -> Result<LockFileGuard, StoreError> {
    let started = Instant::now();

    loop {
        let holder = match try_acquire(lock_path) {
            Ok(guard) => return Ok(guard),
            Err(LockState::Stale(pid)) => {
                tracing::info!(pid, path = %lock_path.display(), "removing stale store lock");
                let _ = std::fs::remove_file(lock_path);
                continue;
            }
            Err(LockState::HeldBy(pid)) => Some(pid),
            Err(LockState::Unknown) => None,
        };

        let waited = started.elapsed();
        if waited >= timeout {
            return Err(StoreError::LockTimeout {
                waited_ms: u64::try_from(waited.as_millis()).unwrap_or(u64::MAX),
                holder,
            });
        }
        std::thread::sleep(LOCK_RETRY_DELAY.min(timeout.saturating_sub(waited)));
    }
}

#[derive(Debug)]
enum LockState {
    HeldBy(u32),
    Stale(u32),
    Unknown,
}

fn try_acquire(lock_path: &Path) -> Result<LockFileGuard, LockState> {
    if let Some(parent) = lock_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    match OpenOptions::new()
        .create_new(true)
        .write(true)
        .open(lock_path)
    {
        Ok(mut file) => {
            let _ = writeln!(file, "{}", std::process::id());
            Ok(LockFileGuard {
                path: lock_path.to_path_buf(),
            })
        }
        Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
            let mut pid_buf = String::new();
            if OpenOptions::new()
                .read(true)
                .open(lock_path)
                .and_then(|mut file| file.read_to_string(&mut pid_buf))
                .is_err()
            {
                return Err(LockState::Unknown);
            }

            // An empty file means the owner has created it but not stamped it yet.
            match pid_buf.trim().parse::<u32>().ok() {
                Some(pid) if pid == std::process::id() || is_process_running(pid) => {
                    Err(LockState::HeldBy(pid))
                }
                Some(pid) => Err(LockState::Stale(pid)),
                None => Err(LockState::Unknown),
            }
        }
        Err(_) => Err(LockState::Unknown),
    }
}

fn is_process_running(pid: u32) -> bool {
    std::process::Command::new("kill")
        .arg("-0")
        .arg(pid.to_string())
        .stderr(std::process::Stdio::null())
        .status()
        .is_ok_and(|status| status.success())
}
