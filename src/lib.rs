//! Repo Stats - lines-of-code metrics for remote git repositories.
//!
//! For one repository URL this library keeps a local mirror up to date, counts
//! its lines of code with `cloc`, and remembers the result in a per-organization
//! JSON cache so that a failed count can still report the last known values.
//!
//! # Public API
//! The main entry point is [`commands::execute_collect`]. The building blocks
//! are re-exported from the [`core`] module:
//! - Repository identity and mirror paths
//! - External command execution
//! - Mirror synchronization and cleanup
//! - Stats extraction and the metrics cache
//! - Error handling and result types

pub mod commands;
pub mod core;

pub use commands::execute_collect;
pub use core::{
    CacheEntry,
    CacheStore,
    CommandRunner,
    // Configuration
    Config,
    LanguageStat,
    Metrics,
    // Error handling
    RepoStatsError,
    // Identity
    RepositoryIdentity,
    Result,
    // Reporting
    RunReport,
    StatsExtractor,
    Step,
    StepFailure,
    Synchronizer,
};
