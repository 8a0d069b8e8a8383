use crate::core::dirs::{get_cache_directory, get_repos_directory};
use crate::core::error::Result;
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_REPOS_PATH: &str = "DA_GIT_REPOS_PATH";
pub const ENV_CACHE_PATH: &str = "DA_GIT_CACHE_PATH";
pub const ENV_SKIP_CLEANUP: &str = "SKIP_CLEANUP";
pub const ENV_FOLLOW_HIERARCHY: &str = "DA_GIT_FOLLOW_HIERARCHY";
pub const ENV_CLOC_BIN: &str = "DA_CLOC_BIN";
pub const ENV_CLOC_FORMAT: &str = "DA_CLOC_FORMAT";
pub const ENV_LOCK_TIMEOUT: &str = "DA_GIT_LOCK_TIMEOUT";

pub const DEFAULT_CLOC_BIN: &str = "cloc";
pub const DEFAULT_LOCK_TIMEOUT_SECS: u64 = 600;

/// Output mode requested from the line-counting tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatsFormat {
    #[default]
    Json,
    Text,
}

impl StatsFormat {
    fn from_setting(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("text") {
            StatsFormat::Text
        } else {
            StatsFormat::Json
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub repos_root: PathBuf,
    pub cache_root: PathBuf,
    pub skip_cleanup: bool,
    pub force_cleanup: bool,
    pub follow_hierarchy: bool,
    pub cloc_bin: String,
    pub stats_format: StatsFormat,
    pub lock_timeout: Duration,
}

impl Config {
    /// Resolve configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let is_set = |key: &str| lookup(key).is_some_and(|value| !value.is_empty());

        let lock_timeout = lookup(ENV_LOCK_TIMEOUT)
            .and_then(|value| value.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_LOCK_TIMEOUT_SECS);

        Ok(Self {
            repos_root: get_repos_directory(lookup(ENV_REPOS_PATH).as_deref())?,
            cache_root: get_cache_directory(lookup(ENV_CACHE_PATH).as_deref())?,
            skip_cleanup: is_set(ENV_SKIP_CLEANUP),
            force_cleanup: false,
            follow_hierarchy: is_set(ENV_FOLLOW_HIERARCHY),
            cloc_bin: lookup(ENV_CLOC_BIN)
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| DEFAULT_CLOC_BIN.to_string()),
            stats_format: lookup(ENV_CLOC_FORMAT)
                .map(|value| StatsFormat::from_setting(&value))
                .unwrap_or_default(),
            lock_timeout: Duration::from_secs(lock_timeout),
        })
    }
}
