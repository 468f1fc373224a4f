//! Update log parsing and writing.

pub mod format;
pub mod parser;
pub mod writer;

use std::path::{Path, PathBuf};

use crate::error::LogError;

pub use format::{LogEntry, Operation, RECORDS_HEADER, TIMESTAMP_FORMAT};
pub use parser::{LogDocument, latest_summary, parse_records, read_log};
pub use writer::{AppendOutcome, append_entries};

/// Sole owner of the update log file on disk.
#[derive(Debug, Clone)]
pub struct ChangeLogStore {
    path: PathBuf,
}

impl ChangeLogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Base name of the log file, used to keep it out of change sets.
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// All well-formed entries of the records section, top to bottom.
    pub fn parse_entries(&self) -> Result<Vec<LogEntry>, LogError> {
        Ok(read_log(&self.path)?.entries())
    }

    /// Summary of the newest entry whose path contains `file_name`.
    pub fn find_latest_summary(&self, file_name: &str) -> Result<Option<String>, LogError> {
        let entries = self.parse_entries()?;
        Ok(latest_summary(&entries, file_name).map(String::from))
    }

    /// Prepend entries that are not already logged verbatim.
    pub fn append_entries(&self, entries: &[LogEntry]) -> Result<AppendOutcome, LogError> {
        append_entries(&self.path, entries)
    }
}
