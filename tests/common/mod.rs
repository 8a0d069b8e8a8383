//! Consolidated test utilities for repo-stats
//!
//! This module provides unified testing utilities for integration tests,
//! focused on real git repositories and fake counting tools.

pub mod assertions;
pub mod fixtures;
pub mod repository;
