//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;

use git2::{IndexAddOption, Oid, Repository, Signature};

/// Update log with a records header and the given record lines.
pub fn log_content(records: &[&str]) -> String {
    let mut content = String::from("# 更新日志\n\n记录项目的每次变更。\n\n## 更新记录\n");
    for line in records {
        content.push_str(line);
        content.push('\n');
    }
    content
}

/// Create a temporary directory for test output.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// A test git repository builder for integration tests.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Create a new empty git repository with a committer identity configured.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");

        let mut config = repo.config().expect("Failed to open repo config");
        config
            .set_str("user.name", "Test User")
            .expect("Failed to set user.name");
        config
            .set_str("user.email", "test@example.com")
            .expect("Failed to set user.email");

        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file relative to the repository root, creating parent dirs.
    pub fn write(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        std::fs::write(&path, content).expect("Failed to write file");
        path
    }

    pub fn remove(&self, rel: &str) {
        std::fs::remove_file(self.path().join(rel)).expect("Failed to remove file");
    }

    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.path().join(rel)).expect("Failed to read file")
    }

    /// Stage everything (including deletions) and commit. Returns the commit OID.
    pub fn commit_all(&self, message: &str) -> Oid {
        let mut index = self.repo.index().expect("Failed to get index");
        index
            .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
            .expect("Failed to add files");
        index
            .update_all(["*"].iter(), None)
            .expect("Failed to update index");
        index.write().expect("Failed to write index");

        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");
        let sig = Signature::now("Test User", "test@example.com")
            .expect("Failed to create signature");

        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit")
    }

    /// Message of the commit HEAD points at.
    pub fn head_message(&self) -> String {
        self.repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .map(|c| c.message().unwrap_or("").to_string())
            .expect("Failed to read HEAD commit")
    }

    pub fn head_oid(&self) -> Oid {
        self.repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .map(|c| c.id())
            .expect("Failed to read HEAD commit")
    }

    /// Current branch name.
    pub fn branch(&self) -> String {
        self.repo
            .head()
            .ok()
            .and_then(|h| h.shorthand().map(String::from))
            .unwrap_or_else(|| "master".to_string())
    }

    /// Add a bare repository as `origin` and push the current branch to it.
    pub fn with_bare_origin(&self) -> tempfile::TempDir {
        let remote_dir = tempfile::tempdir().expect("Failed to create remote dir");
        Repository::init_bare(remote_dir.path()).expect("Failed to init bare repo");

        self.repo
            .remote(
                "origin",
                remote_dir.path().to_str().expect("Invalid remote path"),
            )
            .expect("Failed to add origin remote");

        let status = Command::new("git")
            .args(["push", "origin", &format!("HEAD:refs/heads/{}", self.branch())])
            .current_dir(self.path())
            .status()
            .expect("Failed to push to origin");
        assert!(status.success(), "git push failed in test setup");

        remote_dir
    }
}
