//! External command execution with a controlled environment.
//!
//! Every git and line-counting call goes through [`CommandRunner::run`]. The
//! child environment is cleared and rebuilt from a small allow-list so that
//! output is stable (`LANG=C`) and git never blocks on a credential prompt.
//! The working directory is always passed explicitly; the process-wide
//! current directory is never changed.

use crate::core::error::{RepoStatsError, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Debug, Clone)]
pub struct CommandRunner {
    env: Vec<(String, String)>,
}

impl CommandRunner {
    /// Build the child environment from the current process.
    pub fn from_env() -> Self {
        let home = std::env::var("HOME").unwrap_or_default();
        let path = std::env::var("PATH").unwrap_or_default();
        Self::with_env(home, path)
    }

    pub fn with_env(home: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            env: vec![
                ("LANG".to_string(), "C".to_string()),
                ("HOME".to_string(), home.into()),
                ("PATH".to_string(), path.into()),
                ("GIT_TERMINAL_PROMPT".to_string(), "0".to_string()),
            ],
        }
    }

    /// Same environment with `HOME` replaced.
    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        let home = home.into().to_string_lossy().into_owned();
        for (key, value) in self.env.iter_mut() {
            if key == "HOME" {
                *value = home.clone();
            }
        }
        self
    }

    /// Run `args` and return its decoded stdout.
    ///
    /// A non-zero exit code that is not listed in `ignored_codes` becomes
    /// [`RepoStatsError::CommandFailed`] carrying the decoded stderr.
    pub fn run(&self, args: &[&str], cwd: Option<&Path>, ignored_codes: &[i32]) -> Result<String> {
        let (program, rest) = args
            .split_first()
            .ok_or_else(|| RepoStatsError::command_spawn("", empty_command()))?;
        let display = args.join(" ");

        log::debug!("Running command {display} (cwd: {cwd:?})");

        let mut cmd = Command::new(program);
        cmd.args(rest).env_clear().envs(self.env.iter().cloned());
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }

        let output = cmd
            .output()
            .map_err(|e| RepoStatsError::command_spawn(&display, e))?;

        let stderr = decode_output(&output.stderr);
        // Killed by a signal when there is no code.
        let code = output.status.code().unwrap_or(-1);

        if !output.status.success() && !ignored_codes.contains(&code) {
            log::debug!("Command {display} exited with code {code}");
            return Err(RepoStatsError::command_failed(display, code, stderr.trim_end()));
        }

        if !stderr.is_empty() {
            log::debug!("{}", stderr.trim_end());
        }

        Ok(decode_output(&output.stdout))
    }
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self::from_env()
    }
}

fn empty_command() -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command")
}

/// Decode command output, keeping each invalid byte as a `\xNN` escape.
pub fn decode_output(bytes: &[u8]) -> String {
    let mut decoded = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        decoded.push_str(chunk.valid());
        for byte in chunk.invalid() {
            decoded.push_str(&format!("\\x{byte:02x}"));
        }
    }
    decoded
}
