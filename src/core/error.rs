//! Domain-specific error types and error handling utilities.
//!
//! This module defines [`RepoStatsError`] which covers every failure mode of a
//! metrics run. It uses `thiserror` for ergonomic error definitions and includes
//! constructors for the common failure scenarios.
//!
//! # Public API
//! - [`RepoStatsError`]: Main error enum covering all failure modes
//! - [`Result<T>`]: Type alias for `std::result::Result<T, RepoStatsError>`
//!
//! # Error Categories
//! - **Identity**: URL parsing and organization derivation
//! - **Commands**: spawn failures and non-zero exit codes of external programs
//! - **Cache**: directory creation, read, parse, serialization and write errors
//! - **Extraction**: counting tool output without a usable total
//! - **Locking**: per-repository advisory lock acquisition

use std::path::PathBuf;
use thiserror::Error;

/// Domain-specific error types for repo-stats
#[derive(Error, Debug)]
pub enum RepoStatsError {
    // Identity errors
    #[error("Invalid repository URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("Cannot derive an organization name from '{url}'")]
    MissingOrganization { url: String },

    #[error("Could not determine the home directory")]
    HomeDirectoryNotFound,

    // External command errors
    #[error("Failed to run '{command}': {source}")]
    CommandSpawn {
        command: String,
        source: std::io::Error,
    },

    #[error("Command '{command}' exited with code {code}: {stderr}")]
    CommandFailed {
        command: String,
        code: i32,
        stderr: String,
    },

    // Cache errors
    #[error("Failed to create cache directory '{path}': {source}")]
    CacheDirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read cache file '{path}': {source}")]
    CacheReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse cache file '{path}': {source}")]
    CacheParseFailed {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to serialize cache data: {source}")]
    CacheSerializationFailed { source: serde_json::Error },

    #[error("Failed to write cache file '{path}': {source}")]
    CacheWriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    // Stats errors
    #[error("No usable line count in counting tool output: {reason}")]
    ExtractionFailed { reason: String },

    // Lock errors
    #[error("Failed to lock '{path}': {reason}")]
    LockFailed { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for Results using RepoStatsError
pub type Result<T> = std::result::Result<T, RepoStatsError>;

impl RepoStatsError {
    /// Create an invalid URL error
    pub fn invalid_url(url: impl Into<String>, source: url::ParseError) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            source,
        }
    }

    /// Create a missing organization error
    pub fn missing_organization(url: impl Into<String>) -> Self {
        Self::MissingOrganization { url: url.into() }
    }

    /// Create a command spawn error
    pub fn command_spawn(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandSpawn {
            command: command.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, code: i32, stderr: impl Into<String>) -> Self {
        Self::CommandFailed {
            command: command.into(),
            code,
            stderr: stderr.into(),
        }
    }

    /// Create a cache directory creation failed error
    pub fn cache_directory_creation_failed(
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::CacheDirectoryCreationFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a cache read failed error
    pub fn cache_read_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::CacheReadFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a cache parse failed error
    pub fn cache_parse_failed(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::CacheParseFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a cache serialization failed error
    pub fn cache_serialization_failed(source: serde_json::Error) -> Self {
        Self::CacheSerializationFailed { source }
    }

    /// Create a cache write failed error
    pub fn cache_write_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::CacheWriteFailed {
            path: path.into(),
            source,
        }
    }

    /// Create an extraction failed error
    pub fn extraction_failed(reason: impl Into<String>) -> Self {
        Self::ExtractionFailed {
            reason: reason.into(),
        }
    }

    /// Create a lock failed error
    pub fn lock_failed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::LockFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
