//! Error types for logship modules using thiserror.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from reading or writing the update log.
#[derive(Error, Debug)]
pub enum LogError {
    #[error("Update log not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Update log {} has no '{header}' section", path.display())]
    MissingSection { path: PathBuf, header: String },

    #[error("Failed to read update log: {0}")]
    ReadFailed(#[source] std::io::Error),

    #[error("Failed to write update log: {0}")]
    WriteFailed(#[source] std::io::Error),
}

/// Errors from invoking the git binary.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("git not found on PATH. Install git and try again.")]
    NotInstalled,

    #[error("Failed to run git {operation}: {source}")]
    SpawnFailed {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("git {operation} failed{}: {stderr}",
             code.map_or(String::new(), |c| format!(" with code {c}")))]
    CommandFailed {
        operation: String,
        code: Option<i32>,
        stderr: String,
    },
}

/// Errors from the `sync` entry point.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error(transparent)]
    Log(#[from] LogError),

    #[error(transparent)]
    Git(#[from] GitError),
}

/// Errors from the commit-and-publish pipeline.
#[derive(Error, Debug)]
pub enum ShipError {
    #[error("Not inside a git repository: {0}")]
    NotARepository(String),

    #[error("git status failed: {0}")]
    StatusFailed(String),

    #[error("Failed to stage changes: {0}")]
    StageFailed(String),

    #[error("Failed to read staged changes: {0}")]
    DiffFailed(String),

    #[error("Commit failed: {0}")]
    CommitFailed(String),

    #[error("Push failed: {0}")]
    PushFailed(String),

    #[error(transparent)]
    Git(#[from] GitError),
}
