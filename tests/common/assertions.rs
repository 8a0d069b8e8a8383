//! Common assertion helpers for test output validation
//!
//! Provides predicates and parsers for the JSON result on stdout and the
//! cache document on disk.

#![allow(dead_code)]

use predicates::prelude::*;
use std::path::Path;

/// Parses the single JSON object printed on stdout
pub fn parse_result(stdout: &[u8]) -> serde_json::Value {
    let text = String::from_utf8_lossy(stdout);
    serde_json::from_str(text.trim()).expect("stdout should be one JSON object")
}

/// Reads and parses a cache document
pub fn read_cache(path: &Path) -> serde_json::Value {
    let content = std::fs::read_to_string(path).expect("cache file should exist");
    serde_json::from_str(&content).expect("cache file should be valid JSON")
}

/// Creates a predicate that checks for the styled error header
pub fn has_error() -> impl Predicate<str> {
    predicates::str::contains("✕ Error:")
}

/// Creates a predicate that checks a failed step is listed
pub fn has_failed_step(step: &str) -> impl Predicate<str> {
    predicates::str::contains(step.to_string())
}
