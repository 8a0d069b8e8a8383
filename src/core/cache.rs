//! Per-organization metrics cache.
//!
//! Each organization has one `stats.json` under the cache root, mapping
//! repository names to their last known [`CacheEntry`]. The cache is a
//! fallback: when counting fails the previous values are reported instead.
//!
//! # Guarantees
//! - Loading never fails the run. A missing file is created with an empty
//!   entry, and an unreadable or corrupt file is replaced in memory by an
//!   empty baseline for this repository.
//! - Only this repository's entry is typed. Entries of other repositories are
//!   kept as raw JSON values, whatever their shape.
//! - Persisting holds the organization lock, re-reads the file and replaces
//!   only this repository's entry, so concurrent runs for sibling
//!   repositories never drop each other's results. The document is written
//!   through a temporary file and a rename.

use crate::core::config::DEFAULT_LOCK_TIMEOUT_SECS;
use crate::core::error::{RepoStatsError, Result};
use crate::core::identity::RepositoryIdentity;
use crate::core::lock::FileLock;
use crate::core::state::{CacheDocument, CacheEntry, Metrics};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;

pub const CACHE_FILE_NAME: &str = "stats.json";
const LOCK_SUFFIX: &str = ".lock";

pub struct CacheStore {
    dir: PathBuf,
    path: PathBuf,
    repository: String,
    document: CacheDocument,
    entry: CacheEntry,
    lock_timeout: Duration,
}

impl CacheStore {
    pub fn open(cache_root: &Path, identity: &RepositoryIdentity) -> Self {
        let dir = cache_root.join(&identity.organization);
        let path = dir.join(CACHE_FILE_NAME);
        Self {
            dir,
            path,
            repository: identity.repository.clone(),
            document: CacheDocument::new(),
            entry: CacheEntry::default(),
            lock_timeout: Duration::from_secs(DEFAULT_LOCK_TIMEOUT_SECS),
        }
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Organization-wide lock guarding read-modify-write of the cache file.
    pub fn lock_path(&self) -> PathBuf {
        self.dir.join(format!("{CACHE_FILE_NAME}{LOCK_SUFFIX}"))
    }

    pub fn document(&self) -> &CacheDocument {
        &self.document
    }

    /// Load the organization document, creating this repository's entry when
    /// needed. An error means the fresh document could not be written; the
    /// in-memory state is usable either way.
    pub fn load(&mut self) -> Result<()> {
        self.entry = CacheEntry::default();

        if !self.path.exists() {
            log::debug!("Cache file {} missing, creating it", self.path.display());
            self.document = CacheDocument::new();
            return self.persist();
        }

        self.document = match self.read() {
            Ok(document) => document,
            Err(e) => {
                // Corrupt file: keep the baseline in memory only.
                log::error!("Cache file read error {e}");
                self.document = CacheDocument::new();
                return Ok(());
            }
        };

        match self.document.get(&self.repository) {
            None => {
                log::debug!("Adding {} to cache file", self.repository);
                self.persist()
            }
            Some(value) => {
                match serde_json::from_value::<CacheEntry>(value.clone()) {
                    Ok(entry) => self.entry = entry,
                    Err(e) => log::error!(
                        "Cache entry {} in {} is malformed, ignoring it: {e}",
                        self.repository,
                        self.path.display()
                    ),
                }
                Ok(())
            }
        }
    }

    fn read(&self) -> Result<CacheDocument> {
        let content = fs::read_to_string(&self.path)
            .map_err(|e| RepoStatsError::cache_read_failed(&self.path, e))?;
        serde_json::from_str(&content).map_err(|e| RepoStatsError::cache_parse_failed(&self.path, e))
    }

    /// Typed entry of any repository in the loaded document.
    pub fn get(&self, repository: &str) -> Option<CacheEntry> {
        if repository == self.repository {
            return Some(self.entry.clone());
        }
        self.document
            .get(repository)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Entry of the repository this store was opened for.
    pub fn entry(&self) -> CacheEntry {
        self.entry.clone()
    }

    /// Store fresh metrics for this repository, stamped with `timestamp`.
    pub fn update(&mut self, metrics: &Metrics, timestamp: String) {
        self.entry = CacheEntry {
            loc: metrics.loc,
            pls: metrics.pls.clone(),
            timestamp: Some(timestamp),
        };
    }

    /// Merge this repository's entry into the cache file.
    ///
    /// Under the organization lock the file is read again so that entries
    /// written by other runs since [`load`](Self::load) survive. A file that
    /// cannot be parsed is replaced by the in-memory document.
    pub fn persist(&mut self) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| RepoStatsError::cache_directory_creation_failed(&self.dir, e))?;

        let _lock = FileLock::acquire(&self.lock_path(), self.lock_timeout)?;

        let mut document = if self.path.exists() {
            self.read().unwrap_or_else(|e| {
                log::debug!("Replacing unreadable cache file: {e}");
                self.document.clone()
            })
        } else {
            self.document.clone()
        };
        let entry =
            serde_json::to_value(&self.entry).map_err(RepoStatsError::cache_serialization_failed)?;
        document.insert(self.repository.clone(), entry);

        let json = to_pretty_json(&document)?;

        let mut file = NamedTempFile::new_in(&self.dir)
            .map_err(|e| RepoStatsError::cache_write_failed(&self.path, e))?;
        file.write_all(json.as_bytes())
            .map_err(|e| RepoStatsError::cache_write_failed(&self.path, e))?;
        file.persist(&self.path)
            .map_err(|e| RepoStatsError::cache_write_failed(&self.path, e.error))?;

        self.document = document;
        log::debug!("Cache file {} written", self.path.display());
        Ok(())
    }
}

fn to_pretty_json(document: &CacheDocument) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    document
        .serialize(&mut serializer)
        .map_err(RepoStatsError::cache_serialization_failed)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Current UTC time in ISO-8601 with microseconds and a `+00:00` offset.
pub fn utc_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, false)
}
