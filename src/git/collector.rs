//! Collect working-tree changes into change records.

use tracing::{debug, warn};

use crate::changelog::Operation;
use crate::error::GitError;

use super::executor::VersionControl;
use super::status::{ChangeRecord, file_name_of, parse_name_status};

/// Queries git for changed files and filters out ones that must not be logged.
pub struct ChangeSetCollector<'a, V: VersionControl + ?Sized> {
    vcs: &'a V,
    log_file_name: Option<String>,
}

impl<'a, V: VersionControl + ?Sized> ChangeSetCollector<'a, V> {
    /// `log_file_name` is the base name of the update log, which is never
    /// reported as a change.
    pub fn new(vcs: &'a V, log_file_name: Option<&str>) -> Self {
        Self {
            vcs,
            log_file_name: log_file_name.map(String::from),
        }
    }

    /// Unstaged changes to tracked files, in git's output order.
    pub fn collect_tracked_changes(&self) -> Result<Vec<ChangeRecord>, GitError> {
        let output = self.vcs.diff_name_status()?.into_result("diff")?;
        Ok(parse_name_status(&output.stdout))
    }

    /// Staged changes, in git's output order.
    pub fn collect_staged_changes(&self) -> Result<Vec<ChangeRecord>, GitError> {
        let output = self
            .vcs
            .diff_cached_name_status()?
            .into_result("diff --cached")?;
        Ok(parse_name_status(&output.stdout))
    }

    /// Files outside version control and not excluded by ignore rules.
    pub fn collect_untracked_files(&self) -> Result<Vec<ChangeRecord>, GitError> {
        let output = self.vcs.list_untracked()?.into_result("ls-files")?;
        Ok(output
            .lines()
            .map(|path| ChangeRecord::new(Operation::Added, path))
            .collect())
    }

    /// Tracked changes followed by untracked files.
    pub fn collect_working_tree(&self) -> Result<Vec<ChangeRecord>, GitError> {
        let mut records = self.collect_tracked_changes()?;
        records.extend(self.collect_untracked_files()?);
        debug!("Collected {} working-tree changes", records.len());
        Ok(records)
    }

    /// Whether `path` is the update log itself or matched by ignore rules.
    ///
    /// A failure to run `git check-ignore` counts as not ignored.
    pub fn is_ignored(&self, path: &str) -> bool {
        if self
            .log_file_name
            .as_deref()
            .is_some_and(|name| file_name_of(path) == name)
        {
            return true;
        }

        match self.vcs.check_ignored(path) {
            Ok(output) => output.success,
            Err(e) => {
                warn!("Could not check ignore rules for {}: {}", path, e);
                false
            }
        }
    }

    /// Drop ignored records, keeping order.
    pub fn retain_relevant(&self, records: Vec<ChangeRecord>) -> Vec<ChangeRecord> {
        records
            .into_iter()
            .filter(|r| !self.is_ignored(&r.path))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::executor::{GitOutput, MockVersionControl};
    use mockall::predicate::eq;

    #[test]
    fn test_collect_working_tree_orders_tracked_before_untracked() {
        let mut mock = MockVersionControl::new();
        mock.expect_diff_name_status()
            .times(1)
            .returning(|| Ok(GitOutput::ok("M\tsrc/app.js\nR100\told.css\tnew.css\n")));
        mock.expect_list_untracked()
            .times(1)
            .returning(|| Ok(GitOutput::ok("notes/todo.md\n")));

        let collector = ChangeSetCollector::new(&mock, Some("UPDATE_LOG.md"));
        let records = collector.collect_working_tree().unwrap();

        assert_eq!(
            records,
            vec![
                ChangeRecord::new(Operation::Modified, "src/app.js"),
                ChangeRecord::new(Operation::Renamed, "new.css"),
                ChangeRecord::new(Operation::Added, "notes/todo.md"),
            ]
        );
    }

    #[test]
    fn test_untracked_path_keeps_trailing_space() {
        let mut mock = MockVersionControl::new();
        mock.expect_list_untracked()
            .returning(|| Ok(GitOutput::ok("draft \r\nplain.txt\n")));

        let collector = ChangeSetCollector::new(&mock, None);
        let records = collector.collect_untracked_files().unwrap();
        let paths: Vec<&str> = records.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["draft ", "plain.txt"]);
    }

    #[test]
    fn test_status_failure_aborts_without_partial_results() {
        let mut mock = MockVersionControl::new();
        mock.expect_diff_name_status()
            .returning(|| Ok(GitOutput::failed(128, "fatal: not a git repository")));
        mock.expect_list_untracked().never();

        let collector = ChangeSetCollector::new(&mock, None);
        let result = collector.collect_working_tree();
        assert!(matches!(result, Err(GitError::CommandFailed { .. })));
    }

    #[test]
    fn test_log_file_is_ignored_without_asking_git() {
        let mut mock = MockVersionControl::new();
        mock.expect_check_ignored().never();

        let collector = ChangeSetCollector::new(&mock, Some("UPDATE_LOG.md"));
        assert!(collector.is_ignored("UPDATE_LOG.md"));
        assert!(collector.is_ignored("docs/UPDATE_LOG.md"));
    }

    #[test]
    fn test_is_ignored_follows_check_ignore_exit_status() {
        let mut mock = MockVersionControl::new();
        mock.expect_check_ignored()
            .with(eq("dist/bundle.js"))
            .returning(|_| Ok(GitOutput::ok("")));
        mock.expect_check_ignored()
            .with(eq("src/app.js"))
            .returning(|_| Ok(GitOutput::failed(1, "")));

        let collector = ChangeSetCollector::new(&mock, Some("UPDATE_LOG.md"));
        assert!(collector.is_ignored("dist/bundle.js"));
        assert!(!collector.is_ignored("src/app.js"));
    }

    #[test]
    fn test_is_ignored_spawn_failure_is_not_ignored() {
        let mut mock = MockVersionControl::new();
        mock.expect_check_ignored().returning(|_| {
            Err(GitError::SpawnFailed {
                operation: "check-ignore".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "git"),
            })
        });

        let collector = ChangeSetCollector::new(&mock, None);
        assert!(!collector.is_ignored("a.txt"));
    }

    #[test]
    fn test_retain_relevant_keeps_order() {
        let mut mock = MockVersionControl::new();
        mock.expect_check_ignored()
            .returning(|path| Ok(if path.ends_with(".log") {
                GitOutput::ok("")
            } else {
                GitOutput::failed(1, "")
            }));

        let collector = ChangeSetCollector::new(&mock, Some("UPDATE_LOG.md"));
        let kept = collector.retain_relevant(vec![
            ChangeRecord::new(Operation::Modified, "b.txt"),
            ChangeRecord::new(Operation::Modified, "UPDATE_LOG.md"),
            ChangeRecord::new(Operation::Added, "debug.log"),
            ChangeRecord::new(Operation::Added, "a.txt"),
        ]);

        let paths: Vec<&str> = kept.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["b.txt", "a.txt"]);
    }
}
