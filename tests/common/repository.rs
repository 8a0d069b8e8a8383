//! Git repository management and setup utilities
//!
//! Provides an isolated test environment (home, mirror root, cache root and a
//! directory of "remote" repositories) plus helpers to create and modify
//! upstream repositories with the real `git` binary.

#![allow(dead_code)]

use repo_stats::core::error::{RepoStatsError, Result};
use repo_stats::core::exec::CommandRunner;
use repo_stats::core::identity::RepositoryIdentity;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Isolated directories for one test. The TempDir must be kept alive for the
/// duration of the test to prevent cleanup.
pub struct TestEnv {
    pub temp_dir: TempDir,
    pub home: PathBuf,
    pub repos_root: PathBuf,
    pub cache_root: PathBuf,
    pub remotes_root: PathBuf,
}

impl TestEnv {
    /// Runner whose git calls read this environment's `.gitconfig`.
    pub fn runner(&self) -> CommandRunner {
        CommandRunner::from_env().with_home(&self.home)
    }

    /// Local path of the upstream repository behind `org/repo`.
    pub fn remote_path(&self, org: &str, repo: &str) -> PathBuf {
        self.remotes_root.join(org).join(repo)
    }

    /// Identity whose clone URL points straight at a local upstream.
    pub fn local_identity(&self, org: &str, repo: &str) -> RepositoryIdentity {
        RepositoryIdentity {
            url: self.remote_path(org, repo).to_string_lossy().into_owned(),
            organization: org.to_string(),
            repository: repo.to_string(),
            local_path: self.repos_root.join(format!("{org}-{repo}")),
        }
    }

    pub fn cache_file(&self, org: &str) -> PathBuf {
        self.cache_root.join(org).join("stats.json")
    }
}

/// Sets up a fresh test environment
///
/// The home directory gets a `.gitconfig` that rewrites
/// `https://github.com/` to the local remotes directory, so public-looking
/// URLs resolve to repositories created by [`create_remote`].
pub fn setup_test_env() -> Result<TestEnv> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path().to_path_buf();

    let home = root.join("home");
    let repos_root = root.join("repositories");
    let cache_root = root.join("cache");
    let remotes_root = root.join("remotes");
    for dir in [&home, &repos_root, &cache_root, &remotes_root] {
        fs::create_dir_all(dir)?;
    }

    let gitconfig = format!(
        "[user]\n\tname = Test User\n\temail = test@example.com\n\
         [url \"{}/\"]\n\tinsteadOf = https://github.com/\n",
        remotes_root.display()
    );
    fs::write(home.join(".gitconfig"), gitconfig)?;

    Ok(TestEnv {
        temp_dir,
        home,
        repos_root,
        cache_root,
        remotes_root,
    })
}

/// Runs git in `dir` with the test home, failing on a non-zero exit
pub fn git(env: &TestEnv, dir: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("HOME", &env.home)
        .env("GIT_CONFIG_NOSYSTEM", "1")
        .output()?;

    if !output.status.success() {
        return Err(RepoStatsError::command_failed(
            format!("git {}", args.join(" ")),
            output.status.code().unwrap_or(-1),
            String::from_utf8_lossy(&output.stderr).into_owned(),
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Creates an upstream repository at `<remotes>/<org>/<repo>` with one commit
/// on `branch`
pub fn create_remote(env: &TestEnv, org: &str, repo: &str, branch: &str) -> Result<PathBuf> {
    let path = env.remote_path(org, repo);
    fs::create_dir_all(&path)?;

    git(env, &path, &["init"])?;
    git(env, &path, &["checkout", "-b", branch])?;
    commit_file(env, &path, "README.md", "# test repository\n", "Initial commit")?;

    Ok(path)
}

/// Writes a file and commits it
pub fn commit_file(
    env: &TestEnv,
    repo_path: &Path,
    filename: &str,
    content: &str,
    message: &str,
) -> Result<()> {
    let file = repo_path.join(filename);
    if let Some(parent) = file.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(file, content)?;
    git(env, repo_path, &["add", filename])?;
    git(env, repo_path, &["commit", "-m", message])?;
    Ok(())
}

/// Current branch of a working copy
pub fn current_branch(env: &TestEnv, repo_path: &Path) -> Result<String> {
    Ok(git(env, repo_path, &["rev-parse", "--abbrev-ref", "HEAD"])?
        .trim()
        .to_string())
}
