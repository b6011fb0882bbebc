//! Git operations for commit message generation.
//!
//! All operations shell out to the system `git` binary with
//! `std::process::Command`, inheriting the user's existing git config.

pub mod commit;
pub mod diff;

use std::path::PathBuf;
use std::process::{Command, Output};

use tracing::debug;

use crate::config::Config;
use crate::error::{CommitError, DiffError};

pub use diff::{
    BINARY_PLACEHOLDER, TRUNCATION_MARKER, exclusion_pathspecs, normalize_diff, staged_diff_args,
};

/// Version-control operations used by the generation pipeline.
#[cfg_attr(test, mockall::automock)]
pub trait Vcs: Send + Sync {
    /// Staged diff, normalized and truncated to `max_length` characters.
    fn staged_diff(&self, max_length: usize) -> Result<String, DiffError>;

    /// Current branch name, or an empty string when it cannot be determined.
    fn current_branch(&self) -> String;

    /// Commit the staged changes with `message`.
    fn commit(&self, message: &str) -> Result<(), CommitError>;
}

/// A working tree driven through the `git` binary.
#[derive(Debug, Clone)]
pub struct GitRepo {
    workdir: Option<PathBuf>,
    ignore_files: Vec<String>,
    strict_commit: bool,
}

impl GitRepo {
    /// Operate on the current directory.
    pub fn new(ignore_files: Vec<String>) -> Self {
        Self {
            workdir: None,
            ignore_files,
            strict_commit: false,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.ignore_files.clone()).with_strict_commit(config.strict_commit)
    }

    /// Operate on `dir` instead of the current directory.
    pub fn with_workdir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(dir.into());
        self
    }

    pub fn with_strict_commit(mut self, strict: bool) -> Self {
        self.strict_commit = strict;
        self
    }

    pub fn ignore_files(&self) -> &[String] {
        &self.ignore_files
    }

    /// Run git with `args` and capture its output.
    fn run_git<S: AsRef<std::ffi::OsStr>>(&self, args: &[S]) -> std::io::Result<Output> {
        let mut cmd = Command::new("git");
        cmd.args(args);
        if let Some(dir) = &self.workdir {
            cmd.current_dir(dir);
        }

        let output = cmd.output()?;
        debug!(
            status = ?output.status.code(),
            stdout_len = output.stdout.len(),
            "git {}",
            args.first()
                .map(|a| a.as_ref().to_string_lossy().into_owned())
                .unwrap_or_default()
        );
        Ok(output)
    }
}

impl Vcs for GitRepo {
    fn staged_diff(&self, max_length: usize) -> Result<String, DiffError> {
        diff::read_staged_diff(self, max_length)
    }

    fn current_branch(&self) -> String {
        commit::current_branch(self)
    }

    fn commit(&self, message: &str) -> Result<(), CommitError> {
        commit::commit(self, message)
    }
}
