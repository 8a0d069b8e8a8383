//! Core functionality for the repo-stats tool.
//!
//! This module provides the building blocks of a metrics run: repository
//! identity, command execution, mirror synchronization, line counting, the
//! metrics cache and the cleanup policy.

pub mod cache;
pub mod cleanup;
pub mod config;
pub mod dirs;
pub mod error;
pub mod exec;
pub mod identity;
pub mod lock;
pub mod output;
pub mod state;
pub mod stats;
pub mod sync;

// === Error handling ===
pub use error::{RepoStatsError, Result};

// === Configuration ===
pub use config::{Config, StatsFormat};

// === Identity ===
// URL -> organization, repository name and mirror path
pub use identity::RepositoryIdentity;

// === External commands ===
pub use exec::CommandRunner;

// === Mirror lifecycle ===
pub use cleanup::{clean, format_size, mirror_size, CleanupOutcome, HumanSize};
pub use lock::FileLock;
pub use sync::Synchronizer;

// === Metrics ===
pub use cache::CacheStore;
pub use stats::StatsExtractor;

// === State and reporting ===
pub use state::{
    CacheDocument, CacheEntry, LanguageStat, Metrics, RunReport, Step, StepFailure, SyncReport,
};

// === Output formatting ===
pub use output::{print_error, print_failures};
