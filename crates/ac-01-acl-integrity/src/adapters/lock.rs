//! # Storage Process Locking
//!
//! Prevents two controller processes from driving the same storage
//! directory. Two writers would interleave delete-then-rename installs and
//! leave a blob without a matching digest.
//!
//! Uses `fs2` for cross-platform file locking (flock on Unix, LockFile on
//! Windows).

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors from storage locking
#[derive(Debug, Error)]
pub enum LockError {
    /// Lock file could not be created
    #[error("Failed to create lock file: {0}")]
    CreateFailed(#[source] io::Error),

    /// Storage is already locked by another process
    #[error("Storage already in use ({})", .path.display())]
    AlreadyLocked { pid: Option<u32>, path: PathBuf },

    /// Failed to write PID to lock file
    #[error("Failed to write PID to lock file: {0}")]
    WriteFailed(#[source] io::Error),
}

// =============================================================================
// STORAGE LOCK
// =============================================================================

/// Exclusive lock on the storage directory.
///
/// Acquired at startup, released on drop.
#[derive(Debug)]
pub struct StorageLock {
    /// The lock file handle (kept open to maintain lock)
    file: File,
    /// Path to the lock file
    path: PathBuf,
    /// PID of this process
    pid: u32,
}

impl StorageLock {
    /// Lock file name
    const LOCK_FILE: &'static str = ".access-controller.lock";

    /// Acquire an exclusive lock on `dir`.
    ///
    /// # Errors
    ///
    /// Returns `LockError::AlreadyLocked` if another process holds the lock.
    pub fn acquire(dir: &Path) -> Result<Self, LockError> {
        let lock_path = dir.join(Self::LOCK_FILE);

        // Opened without truncation so a failed attempt does not wipe the
        // holder's PID.
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(LockError::CreateFailed)?;

        if file.try_lock_exclusive().is_err() {
            return Err(LockError::AlreadyLocked {
                pid: Self::read_existing_pid(&lock_path),
                path: lock_path,
            });
        }

        let pid = std::process::id();
        file.set_len(0).map_err(LockError::WriteFailed)?;
        writeln!(file, "{}", pid).map_err(LockError::WriteFailed)?;
        file.sync_all().map_err(LockError::WriteFailed)?;

        Ok(Self {
            file,
            path: lock_path,
            pid,
        })
    }

    /// PID of the process holding the lock
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Path to the lock file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_existing_pid(path: &Path) -> Option<u32> {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|s| s.trim().parse().ok())
    }
}

impl Drop for StorageLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
        let _ = std::fs::remove_file(&self.path);
    }
}

// =============================================================================
// TESTS
// =============================================================================
