//! The git binary as an injected collaborator.
//!
//! Every call shells out to the system `git`, inheriting the user's config,
//! SSH agent, and credential store. Callers only look at the exit status;
//! stderr is kept for display.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::error::GitError;

/// Captured result of one git invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl GitOutput {
    /// Successful output with the given stdout.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Failed output with the given exit code and stderr.
    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Non-empty stdout lines with any `\r` stripped.
    ///
    /// Other whitespace is kept, since a path may end in a space.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.stdout
            .lines()
            .map(|l| l.trim_end_matches('\r'))
            .filter(|l| !l.is_empty())
    }

    /// Convert a non-zero exit into [`GitError::CommandFailed`].
    pub fn into_result(self, operation: &str) -> Result<GitOutput, GitError> {
        if self.success {
            Ok(self)
        } else {
            Err(GitError::CommandFailed {
                operation: operation.to_string(),
                code: self.code,
                stderr: self.stderr.trim().to_string(),
            })
        }
    }
}

/// Version-control operations used by the sync and ship flows.
///
/// `Err` means git could not be run at all; a non-zero exit is an `Ok`
/// output with `success == false`. This abstraction allows scripting git
/// in tests.
#[cfg_attr(test, mockall::automock)]
pub trait VersionControl {
    /// `git rev-parse --abbrev-ref HEAD`
    fn current_branch(&self) -> Result<GitOutput, GitError>;

    /// `git status --short`
    fn status_short(&self) -> Result<GitOutput, GitError>;

    /// `git add -A`
    fn stage_all(&self) -> Result<GitOutput, GitError>;

    /// `git diff --name-status` (unstaged changes to tracked files)
    fn diff_name_status(&self) -> Result<GitOutput, GitError>;

    /// `git diff --name-status --cached`
    fn diff_cached_name_status(&self) -> Result<GitOutput, GitError>;

    /// `git commit -m <message>`
    fn commit(&self, message: &str) -> Result<GitOutput, GitError>;

    /// `git pull --no-rebase <remote> <branch>`
    fn pull_no_rebase(&self, remote: &str, branch: &str) -> Result<GitOutput, GitError>;

    /// `git push <remote> <branch>`
    fn push(&self, remote: &str, branch: &str) -> Result<GitOutput, GitError>;

    /// `git ls-files --others --exclude-standard`
    fn list_untracked(&self) -> Result<GitOutput, GitError>;

    /// `git check-ignore -q -- <path>`; exit 0 means ignored.
    fn check_ignored(&self, path: &str) -> Result<GitOutput, GitError>;
}

/// Default implementation backed by the `git` binary.
#[derive(Debug, Clone)]
pub struct GitCli {
    workdir: PathBuf,
}

impl GitCli {
    /// Run git commands inside `workdir`.
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn run(&self, args: &[&str], operation: &str) -> Result<GitOutput, GitError> {
        debug!("git {}", args.join(" "));

        // quotepath=false keeps non-ASCII paths readable instead of octal-escaped.
        let output = Command::new("git")
            .args(["-c", "core.quotepath=false"])
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .map_err(|source| GitError::SpawnFailed {
                operation: operation.to_string(),
                source,
            })?;

        Ok(GitOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

impl VersionControl for GitCli {
    fn current_branch(&self) -> Result<GitOutput, GitError> {
        self.run(&["rev-parse", "--abbrev-ref", "HEAD"], "rev-parse")
    }

    fn status_short(&self) -> Result<GitOutput, GitError> {
        self.run(&["status", "--short"], "status")
    }

    fn stage_all(&self) -> Result<GitOutput, GitError> {
        self.run(&["add", "-A"], "add")
    }

    fn diff_name_status(&self) -> Result<GitOutput, GitError> {
        self.run(&["diff", "--name-status"], "diff")
    }

    fn diff_cached_name_status(&self) -> Result<GitOutput, GitError> {
        self.run(&["diff", "--name-status", "--cached"], "diff --cached")
    }

    fn commit(&self, message: &str) -> Result<GitOutput, GitError> {
        self.run(&["commit", "-m", message], "commit")
    }

    fn pull_no_rebase(&self, remote: &str, branch: &str) -> Result<GitOutput, GitError> {
        self.run(&["pull", "--no-rebase", remote, branch], "pull")
    }

    fn push(&self, remote: &str, branch: &str) -> Result<GitOutput, GitError> {
        self.run(&["push", remote, branch], "push")
    }

    fn list_untracked(&self) -> Result<GitOutput, GitError> {
        self.run(&["ls-files", "--others", "--exclude-standard"], "ls-files")
    }

    fn check_ignored(&self, path: &str) -> Result<GitOutput, GitError> {
        self.run(&["check-ignore", "-q", "--", path], "check-ignore")
    }
}

/// Check that the git binary is on PATH.
pub fn check_git_installed() -> Result<(), GitError> {
    which::which("git").map(|_| ()).map_err(|_| GitError::NotInstalled)
}

/// Working directory of the repository containing `start`, if any.
pub fn locate_repository(start: &Path) -> Option<PathBuf> {
    let repo = git2::Repository::discover(start).ok()?;
    repo.workdir().map(Path::to_path_buf)
}
