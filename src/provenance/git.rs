//! Local git transport
//!
//! All git access of the engine goes through [`GitRunner`], which runs one
//! git command line and returns its standard output. [`SystemGit`] is the
//! implementation backed by the `git` executable.

use std::path::PathBuf;
use std::process::Stdio;

#[cfg(test)]
use mockall::automock;
use tokio::process::Command;
use tracing::debug;

use crate::config::GitConfig;
use crate::provenance::error::GitError;

/// Trait for running git command lines
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait GitRunner: Send + Sync {
    /// Runs git with the given arguments
    ///
    /// # Returns
    /// * `Ok(String)` - Captured standard output
    /// * `Err(GitError)` - Spawn failure or non-zero exit, with stderr and exit code
    async fn run(&self, args: &[String]) -> Result<String, GitError>;
}

/// Build an argument list from string slices
pub fn git_args<const N: usize>(args: [&str; N]) -> Vec<String> {
    args.into_iter().map(str::to_string).collect()
}

/// Git runner backed by the system `git` executable
pub struct SystemGit {
    binary: String,
    working_dir: PathBuf,
}

impl SystemGit {
    pub fn new(binary: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            working_dir: working_dir.into(),
        }
    }

    pub fn from_config(config: &GitConfig) -> Self {
        Self::new(config.binary.clone(), config.working_dir.clone())
    }

    fn command_line(&self, args: &[String]) -> String {
        std::iter::once(self.binary.as_str())
            .chain(args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[async_trait::async_trait]
impl GitRunner for SystemGit {
    async fn run(&self, args: &[String]) -> Result<String, GitError> {
        let command = self.command_line(args);
        debug!("Running {} in {:?}", command, self.working_dir);

        let output = Command::new(&self.binary)
            .args(args)
            .current_dir(&self.working_dir)
            // Never block on credential prompts for private remotes
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| GitError::Spawn {
                command: command.clone(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(GitError::CommandFailed {
                command,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                exit_code: output.status.code(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
