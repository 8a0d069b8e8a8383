//! Advisory file locks.
//!
//! Two kinds of lock files live in `<cacheRoot>/<org>/`:
//! - `<repo-key>.lock` serializes whole runs against one repository, so two
//!   runs never touch the same mirror at once.
//! - `stats.json.lock` serializes read-modify-write of the organization
//!   cache file between runs for different repositories.
//!
//! Locks are exclusive `fs2` locks released on drop. The lock files are left
//! in place afterwards; only the lock held on them matters.

use crate::core::error::{RepoStatsError, Result};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const LOCK_RETRY: Duration = Duration::from_millis(200);

#[derive(Debug)]
pub struct FileLock {
    file: File,
    path: PathBuf,
}

impl FileLock {
    /// Wait up to `timeout` for the exclusive lock at `path`.
    pub fn acquire(path: &Path, timeout: Duration) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| RepoStatsError::lock_failed(path, e.to_string()))?;
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| RepoStatsError::lock_failed(path, e.to_string()))?;

        let start = Instant::now();
        loop {
            match FileExt::try_lock_exclusive(&file) {
                Ok(()) => break,
                Err(err) if err.kind() == ErrorKind::WouldBlock => {
                    if start.elapsed() >= timeout {
                        return Err(RepoStatsError::lock_failed(
                            path,
                            format!("timed out after {}s", timeout.as_secs()),
                        ));
                    }
                    log::debug!("Waiting for lock {}", path.display());
                    std::thread::sleep(LOCK_RETRY);
                }
                Err(err) => return Err(RepoStatsError::lock_failed(path, err.to_string())),
            }
        }

        log::debug!("Acquired lock {}", path.display());
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
