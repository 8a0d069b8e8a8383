use crate::core::error::{RepoStatsError, Result};
use std::path::PathBuf;

pub const DEFAULT_REPOS_PATH: &str = "~/.perceval/repositories";
pub const DEFAULT_CACHE_PATH: &str = "~/.perceval/cache";

/// Expand a leading `~` to the user's home directory.
pub fn expand_home(path: &str) -> Result<PathBuf> {
    if path == "~" {
        return dirs::home_dir().ok_or(RepoStatsError::HomeDirectoryNotFound);
    }

    match path.strip_prefix("~/") {
        Some(rest) => {
            let home = dirs::home_dir().ok_or(RepoStatsError::HomeDirectoryNotFound)?;
            Ok(home.join(rest))
        }
        None => Ok(PathBuf::from(path)),
    }
}

pub fn get_repos_directory(configured: Option<&str>) -> Result<PathBuf> {
    expand_home(configured.unwrap_or(DEFAULT_REPOS_PATH))
}

pub fn get_cache_directory(configured: Option<&str>) -> Result<PathBuf> {
    expand_home(configured.unwrap_or(DEFAULT_CACHE_PATH))
}
