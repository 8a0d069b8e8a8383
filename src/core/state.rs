//! State and reporting data structures.
//!
//! This module defines the records shared between the synchronizer, the stats
//! extractor, the cache store and the final JSON result.
//!
//! # Public API
//! - [`LanguageStat`]: One row of the per-language summary
//! - [`CacheEntry`]: Last known metrics of one repository
//! - [`CacheDocument`]: Every entry of one organization, keyed by repository,
//!   kept as raw JSON so entries of other repositories survive untouched
//! - [`StepFailure`]/[`Step`]: A failed step recorded during a run
//! - [`SyncReport`]/[`RunReport`]: Outcomes of synchronization and of a whole run
//!
//! # Encoding
//! Counts are `u64` in memory and decimal strings on disk and on stdout, which
//! is the format downstream consumers already read. Reading accepts either.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const TOTAL_LANGUAGE: &str = "Total";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageStat {
    pub language: String,
    #[serde(with = "count_string")]
    pub files: u64,
    #[serde(with = "count_string")]
    pub blank: u64,
    #[serde(with = "count_string")]
    pub comment: u64,
    #[serde(with = "count_string")]
    pub code: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheEntry {
    pub loc: u64,
    pub pls: Vec<LanguageStat>,
    pub timestamp: Option<String>,
}

pub type CacheDocument = serde_json::Map<String, serde_json::Value>;

/// The metrics printed on stdout.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Metrics {
    pub loc: u64,
    pub pls: Vec<LanguageStat>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Lock,
    Cache,
    Clone,
    Fetch,
    FetchPrune,
    DefaultBranch,
    Checkout,
    Pull,
    Stats,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Lock => "lock",
            Step::Cache => "cache",
            Step::Clone => "clone",
            Step::Fetch => "fetch",
            Step::FetchPrune => "fetch-prune",
            Step::DefaultBranch => "default-branch",
            Step::Checkout => "checkout",
            Step::Pull => "pull",
            Step::Stats => "stats",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFailure {
    pub step: Step,
    pub message: String,
}

impl StepFailure {
    pub fn new(step: Step, error: impl fmt::Display) -> Self {
        Self {
            step,
            message: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// True only when a pull reported no new commits.
    pub uptodate: bool,
    pub failures: Vec<StepFailure>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub metrics: Metrics,
    pub uptodate: bool,
    pub failures: Vec<StepFailure>,
}

impl RunReport {
    pub fn is_errored(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_errored() {
            1
        } else {
            0
        }
    }
}

mod count_string {
    use serde::de::{self, Deserializer, Visitor};
    use serde::Serializer;
    use std::fmt;

    pub fn serialize<S>(value: &u64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct CountVisitor;

        impl Visitor<'_> for CountVisitor {
            type Value = u64;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a non-negative count as a number or a decimal string")
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<u64, E> {
                Ok(value)
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<u64, E> {
                u64::try_from(value).map_err(E::custom)
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<u64, E> {
                value.trim().parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(CountVisitor)
    }
}
