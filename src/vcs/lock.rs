// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Per-checkout exclusive file lock.
//!
//! ```text
//! <vcs_root>/<project>/<component>        checkout
//! <vcs_root>/<project>/<component>.lock   lock file (sibling)
//!
//! RepositoryLock::acquire(timeout)
//!   try_lock every 100ms --> RepositoryLockGuard  (released on drop)
//!                        --> LockError::Timeout   (retried by jobs)
//! ```
//!
//! The guard is the proof argument of every mutating VCS call.

use std::fs::{File, OpenOptions, TryLockError};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

use crate::error::LockError;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Lock protecting one checkout directory.
#[derive(Debug, Clone)]
pub struct RepositoryLock {
    checkout: PathBuf,
    lock_path: PathBuf,
}

impl RepositoryLock {
    /// Lock for `checkout`, stored next to it as `<name>.lock`.
    #[must_use]
    pub fn new(checkout: impl Into<PathBuf>) -> Self {
        let checkout = checkout.into();
        let mut name = checkout
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".lock");
        let lock_path = checkout.with_file_name(name);
        Self {
            checkout,
            lock_path,
        }
    }

    #[must_use]
    pub fn checkout(&self) -> &Path {
        &self.checkout
    }

    #[must_use]
    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    /// Waits up to `timeout` for the exclusive lock.
    ///
    /// # Errors
    ///
    /// Returns `LockError::Timeout` if another holder keeps the lock for the
    /// whole period, or `LockError::Io` if the lock file cannot be opened.
    pub async fn acquire(&self, timeout: Duration) -> Result<RepositoryLockGuard, LockError> {
        let io_error = |source| LockError::Io {
            path: self.lock_path.display().to_string(),
            source,
        };

        if let Some(parent) = self.lock_path.parent() {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)
            .map_err(io_error)?;

        let started = Instant::now();
        loop {
            match file.try_lock() {
                Ok(()) => {
                    debug!(lock = %self.lock_path.display(), "lock acquired");
                    return Ok(RepositoryLockGuard {
                        checkout: self.checkout.clone(),
                        _file: file,
                    });
                }
                Err(TryLockError::WouldBlock) => {
                    if started.elapsed() >= timeout {
                        return Err(LockError::Timeout {
                            path: self.lock_path.display().to_string(),
                            waited_secs: timeout.as_secs(),
                        });
                    }
                    trace!(lock = %self.lock_path.display(), "lock busy, waiting");
                    tokio::time::sleep(POLL_INTERVAL).await;
                }
                Err(TryLockError::Error(e)) => return Err(io_error(e)),
            }
        }
    }
}

/// Held exclusive lock of one checkout.
#[derive(Debug)]
pub struct RepositoryLockGuard {
    checkout: PathBuf,
    _file: File,
}

impl RepositoryLockGuard {
    /// Checkout protected by this guard.
    #[must_use]
    pub fn checkout(&self) -> &Path {
        &self.checkout
    }

    /// Whether this guard protects `path`.
    #[must_use]
    pub fn covers(&self, path: &Path) -> bool {
        self.checkout == path
    }
}
