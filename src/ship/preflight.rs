//! Preflight checks for the ship pipeline.
//!
//! Resolves the current branch and decides whether there is anything to
//! commit before the working tree is touched.

use tracing::{debug, warn};

use crate::config::Config;
use crate::error::ShipError;
use crate::git::{ChangeRecord, VersionControl, parse_status_short};

/// Result of the branch check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchCheck {
    pub branch: String,
    /// False when the branch is outside the configured allow-list.
    pub allowed: bool,
}

/// Pending changes reported by `git status --short`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusCheck {
    /// Raw status lines, for display.
    pub lines: Vec<String>,
    pub records: Vec<ChangeRecord>,
}

impl StatusCheck {
    pub fn is_clean(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Resolve the current branch.
///
/// Fails when git cannot tell the branch, which means the directory is
/// not a repository. A branch outside the allow-list is only flagged.
pub fn check_branch<V: VersionControl + ?Sized>(
    vcs: &V,
    config: &Config,
) -> Result<BranchCheck, ShipError> {
    let output = vcs.current_branch()?;
    if !output.success {
        return Err(ShipError::NotARepository(describe_failure(
            &output.stderr,
            output.code,
        )));
    }

    let branch = output.stdout.trim().to_string();
    let allowed = config.is_allowed_branch(&branch);
    if !allowed {
        warn!("Branch {} is not in the allow-list", branch);
    }
    debug!("Current branch: {}", branch);

    Ok(BranchCheck { branch, allowed })
}

/// Read the short status of the working tree.
pub fn check_status<V: VersionControl + ?Sized>(vcs: &V) -> Result<StatusCheck, ShipError> {
    let output = vcs.status_short()?;
    if !output.success {
        return Err(ShipError::StatusFailed(describe_failure(
            &output.stderr,
            output.code,
        )));
    }

    Ok(StatusCheck {
        lines: output.lines().map(String::from).collect(),
        records: parse_status_short(&output.stdout),
    })
}

/// Human-readable reason for a failed git call.
pub(crate) fn describe_failure(stderr: &str, code: Option<i32>) -> String {
    let stderr = stderr.trim();
    if !stderr.is_empty() {
        return stderr.to_string();
    }
    match code {
        Some(c) => format!("exited with code {c}"),
        None => "terminated by signal".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changelog::Operation;
    use crate::git::executor::{GitOutput, MockVersionControl};

    #[test]
    fn test_check_branch_allowed() {
        let mut mock = MockVersionControl::new();
        mock.expect_current_branch()
            .returning(|| Ok(GitOutput::ok("main\n")));

        let check = check_branch(&mock, &Config::default()).unwrap();
        assert_eq!(check.branch, "main");
        assert!(check.allowed);
    }

    #[test]
    fn test_check_branch_outside_allow_list_is_not_fatal() {
        let mut mock = MockVersionControl::new();
        mock.expect_current_branch()
            .returning(|| Ok(GitOutput::ok("feature/login\n")));

        let check = check_branch(&mock, &Config::default()).unwrap();
        assert_eq!(check.branch, "feature/login");
        assert!(!check.allowed);
    }

    #[test]
    fn test_check_branch_not_a_repository() {
        let mut mock = MockVersionControl::new();
        mock.expect_current_branch().returning(|| {
            Ok(GitOutput::failed(
                128,
                "fatal: not a git repository (or any of the parent directories): .git\n",
            ))
        });

        let err = check_branch(&mock, &Config::default()).unwrap_err();
        match err {
            ShipError::NotARepository(msg) => assert!(msg.starts_with("fatal: not a git")),
            other => panic!("Expected NotARepository, got {other:?}"),
        }
    }

    #[test]
    fn test_check_status_clean_and_dirty() {
        let mut clean = MockVersionControl::new();
        clean.expect_status_short().returning(|| Ok(GitOutput::ok("")));
        assert!(check_status(&clean).unwrap().is_clean());

        let mut dirty = MockVersionControl::new();
        dirty
            .expect_status_short()
            .returning(|| Ok(GitOutput::ok(" M src/app.js\n?? new.txt\n")));
        let status = check_status(&dirty).unwrap();
        assert!(!status.is_clean());
        assert_eq!(status.lines, vec![" M src/app.js", "?? new.txt"]);
        assert_eq!(status.records[1].status, Operation::Added);
    }

    #[test]
    fn test_describe_failure_without_stderr() {
        assert_eq!(describe_failure("  ", Some(1)), "exited with code 1");
        assert_eq!(describe_failure("", None), "terminated by signal");
        assert_eq!(describe_failure("boom\n", Some(1)), "boom");
    }
}
