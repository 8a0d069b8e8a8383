//! Mirror synchronization using the system `git` binary.
//!
//! A missing mirror is cloned. An existing one is refreshed: fetch, fetch with
//! pruning, detect the remote default branch, check it out and pull it. Each
//! git call may fail on its own (network, auth, empty remote); a failure is
//! logged and recorded in the [`SyncReport`] and the remaining steps still
//! run, so a partially refreshed mirror can still be counted.

use crate::core::error::Result;
use crate::core::exec::CommandRunner;
use crate::core::identity::RepositoryIdentity;
use crate::core::state::{Step, StepFailure, SyncReport};
use std::path::Path;

pub const UP_TO_DATE_MARKER: &str = "Already up to date.";
const UP_TO_DATE_MIN_LEN: usize = 18;
const REMOTE: &str = "origin";
const REMOTE_HEAD: &str = "refs/remotes/origin/HEAD";

pub struct Synchronizer<'a> {
    runner: &'a CommandRunner,
    identity: &'a RepositoryIdentity,
}

impl<'a> Synchronizer<'a> {
    pub fn new(runner: &'a CommandRunner, identity: &'a RepositoryIdentity) -> Self {
        Self { runner, identity }
    }

    fn mirror(&self) -> &Path {
        &self.identity.local_path
    }

    fn git(&self, args: &[&str]) -> Result<String> {
        let mut cmd = vec!["git"];
        cmd.extend_from_slice(args);
        self.runner.run(&cmd, Some(self.mirror()), &[])
    }

    pub fn synchronize(&self) -> SyncReport {
        let mut report = SyncReport::default();

        if self.mirror().exists() {
            self.fetch(&mut report);
            report.uptodate = self.pull(&mut report);
        } else {
            self.clone_mirror(&mut report);
        }

        report
    }

    fn clone_mirror(&self, report: &mut SyncReport) {
        let target = self.mirror().to_string_lossy().into_owned();
        let cmd = ["git", "clone", self.identity.url.as_str(), target.as_str()];

        match self.runner.run(&cmd, None, &[]) {
            Ok(_) => log::debug!("Git {} repository cloned into {target}", self.identity.url),
            Err(e) => record(report, Step::Clone, "Git clone error", e),
        }
    }

    fn fetch(&self, report: &mut SyncReport) {
        match self.git(&["fetch"]) {
            Ok(_) => log::debug!("Git {} fetch updated code", self.mirror().display()),
            Err(e) => record(report, Step::Fetch, "Git fetch error", e),
        }

        match self.git(&["fetch", "-p"]) {
            Ok(_) => log::debug!("Git {} fetch purge code", self.mirror().display()),
            Err(e) => record(report, Step::FetchPrune, "Git fetch purge error", e),
        }
    }

    /// Ask the remote for its `HEAD` and return the branch it points to.
    pub fn default_branch(&self) -> Result<Option<String>> {
        self.git(&["remote", "set-head", REMOTE, "--auto"])?;
        let head = self.git(&["symbolic-ref", "--short", REMOTE_HEAD])?;
        let head = head.trim();
        let branch = head
            .strip_prefix(&format!("{REMOTE}/"))
            .unwrap_or(head)
            .to_string();

        Ok(Some(branch).filter(|b| !b.is_empty()))
    }

    /// Returns true when the pull reported no new commits.
    fn pull(&self, report: &mut SyncReport) -> bool {
        let branch = match self.default_branch() {
            Ok(branch) => branch,
            Err(e) => {
                record(report, Step::DefaultBranch, "Git find active branch error", e);
                None
            }
        };

        let Some(branch) = branch else {
            log::debug!("Git repository active branch missing");
            log::debug!("Git {} repository pull skip", self.mirror().display());
            return false;
        };

        log::debug!(
            "Git {} repository active branch is: {branch}",
            self.mirror().display()
        );

        match self.git(&["checkout", &branch]) {
            Ok(_) => log::debug!(
                "Git {} repository checkout with following branch {branch}",
                self.mirror().display()
            ),
            Err(e) => record(report, Step::Checkout, "Git checkout error", e),
        }

        match self.git(&["pull", REMOTE, &branch]) {
            Ok(output) => {
                log::debug!("Git {} repository pull updated code", self.mirror().display());
                is_up_to_date(&output)
            }
            Err(e) => {
                record(report, Step::Pull, "Git pull error", e);
                false
            }
        }
    }
}

pub fn is_up_to_date(pull_output: &str) -> bool {
    pull_output.len() >= UP_TO_DATE_MIN_LEN && pull_output.contains(UP_TO_DATE_MARKER)
}

fn record(report: &mut SyncReport, step: Step, context: &str, error: impl std::fmt::Display) {
    log::error!("{context} {error}");
    report.failures.push(StepFailure::new(step, error));
}
