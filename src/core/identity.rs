//! Repository identity derived from a remote URL.
//!
//! [`RepositoryIdentity::resolve`] turns an arbitrary clone URL into the
//! organization name, repository name and local mirror path used by every
//! other step. Resolution is pure: no network or filesystem access happens
//! here, and the same URL always yields the same identity.
//!
//! # Naming rules
//! - A single trailing `.git` is stripped from the URL.
//! - On public hosting services (GitHub, GitLab, Bitbucket) the organization
//!   is the first path segment; elsewhere it is the second dot label of the
//!   host (`gerrit.onap.org` → `onap`).
//! - Gerrit routing prefixes (`/r/`, `/gerrit/`) are dropped from the path.
//! - The path is percent-decoded first, so names keep spaces and non-ASCII
//!   characters.
//! - The flattened layout turns `/` and `_` into `-` and removes dots.

use crate::core::error::{RepoStatsError, Result};
use percent_encoding::percent_decode_str;
use std::path::{Path, PathBuf};
use url::Url;

const GIT_SUFFIX: &str = ".git";
const HOSTING_SERVICES: [&str; 3] = ["github.com", "gitlab.com", "bitbucket.org"];
const ROUTING_PREFIXES: [&str; 2] = ["/r/", "/gerrit/"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryIdentity {
    pub url: String,
    pub organization: String,
    pub repository: String,
    pub local_path: PathBuf,
}

impl RepositoryIdentity {
    pub fn resolve(url: &str, repos_root: &Path, follow_hierarchy: bool) -> Result<Self> {
        let url = strip_git_suffix(url).to_string();
        let parsed = Url::parse(&url).map_err(|e| RepoStatsError::invalid_url(&url, e))?;
        let host = parsed.host_str().unwrap_or_default();
        // Names are derived from the path as written, not its escaped form.
        let path = percent_decode_str(parsed.path()).decode_utf8_lossy();

        let organization = if is_hosting_service(host) {
            organization_from_path(&path)
        } else {
            organization_from_host(host)
        }
        .filter(|org| !org.is_empty())
        .ok_or_else(|| RepoStatsError::missing_organization(&url))?;

        let repository = repository_name(&path, &organization, follow_hierarchy);

        let local_path = if follow_hierarchy {
            repos_root.join(&organization).join(&repository)
        } else {
            repos_root.join(format!("{organization}-{repository}"))
        };

        Ok(Self {
            url,
            organization,
            repository,
            local_path,
        })
    }

    /// Filesystem-safe key for files named after the repository.
    pub fn file_key(&self) -> String {
        self.repository.replace('/', "-")
    }
}

/// Strip one trailing `.git`, if present.
pub fn strip_git_suffix(url: &str) -> &str {
    url.strip_suffix(GIT_SUFFIX).unwrap_or(url)
}

pub fn is_hosting_service(host: &str) -> bool {
    HOSTING_SERVICES.iter().any(|service| host.contains(service))
}

/// Drop a gerrit routing prefix and any leading slashes.
pub fn sanitize_path(path: &str) -> &str {
    let path = ROUTING_PREFIXES
        .iter()
        .find_map(|prefix| path.strip_prefix(prefix))
        .unwrap_or(path);
    path.trim_start_matches('/')
}

fn organization_from_path(path: &str) -> Option<String> {
    sanitize_path(path).split('/').next().map(str::to_string)
}

fn organization_from_host(host: &str) -> Option<String> {
    host.split('.').nth(1).map(str::to_string)
}

fn repository_name(path: &str, organization: &str, follow_hierarchy: bool) -> String {
    let path = sanitize_path(path);
    let path = path
        .strip_prefix(&format!("{organization}/"))
        .unwrap_or(path);

    if follow_hierarchy {
        return path.to_string();
    }

    path.replace(['/', '_'], "-").replace('.', "")
}
