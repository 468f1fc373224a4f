//! Commit message synthesis from change records and update log history.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::changelog::{ChangeLogStore, LogEntry, latest_summary};
use crate::git::ChangeRecord;

/// Label that opens every synthesized message.
pub const MESSAGE_PREFIX: &str = "更新：";

/// Joins one file's name to its summary.
pub const NAME_SEPARATOR: &str = "，";

/// Joins consecutive file summaries.
pub const FILE_SEPARATOR: &str = "；";

/// Message used when no relevant file is left after filtering.
pub const FALLBACK_MESSAGE: &str = "文件修改";

/// Default summary for a file with no history that still exists.
pub const DEFAULT_MODIFIED: &str = "修改文件";

/// Default summary for a file with no history that is gone from disk.
pub const DEFAULT_DELETED: &str = "删除文件";

/// One `(file name, summary)` pair of a commit message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSummary {
    pub file_name: String,
    pub summary: String,
}

/// A synthesized commit message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitMessage {
    /// Pairs in discovery order.
    pub files: Vec<FileSummary>,
}

impl CommitMessage {
    /// Format the message for `git commit -m`.
    ///
    /// Produces:
    /// ```text
    /// 更新：app.js，新增压缩；index.html，修改文件
    /// ```
    /// or [`FALLBACK_MESSAGE`] when there are no files.
    pub fn format(&self) -> String {
        if self.files.is_empty() {
            return FALLBACK_MESSAGE.to_string();
        }

        let body: Vec<String> = self
            .files
            .iter()
            .map(|f| format!("{}{}{}", f.file_name, NAME_SEPARATOR, f.summary))
            .collect();

        format!("{}{}", MESSAGE_PREFIX, body.join(FILE_SEPARATOR))
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl fmt::Display for CommitMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

/// Resolves a summary for each changed file from a snapshot of the update log.
///
/// The snapshot is taken once, so every lookup in a run sees the same history.
#[derive(Debug, Clone)]
pub struct SummarySynthesizer {
    history: Vec<LogEntry>,
    root: PathBuf,
}

impl SummarySynthesizer {
    /// `root` is the directory that change-record paths are relative to.
    pub fn new(history: Vec<LogEntry>, root: impl Into<PathBuf>) -> Self {
        Self {
            history,
            root: root.into(),
        }
    }

    /// Snapshot the store's entries. An unreadable log yields empty history.
    pub fn from_store(store: &ChangeLogStore, root: impl Into<PathBuf>) -> Self {
        let history = match store.parse_entries() {
            Ok(entries) => entries,
            Err(e) => {
                warn!("{}; falling back to default summaries", e);
                Vec::new()
            }
        };
        debug!("Loaded {} update log entries", history.len());
        Self::new(history, root)
    }

    pub fn history(&self) -> &[LogEntry] {
        &self.history
    }

    /// Summary for one record: newest matching log entry, else existence-based default.
    ///
    /// The default ignores the recorded status, since the file may have
    /// been restored or removed after git reported it.
    pub fn resolve_summary(&self, record: &ChangeRecord) -> String {
        if let Some(summary) = latest_summary(&self.history, record.file_name()) {
            return summary.to_string();
        }

        if self.exists_on_disk(&record.path) {
            DEFAULT_MODIFIED.to_string()
        } else {
            DEFAULT_DELETED.to_string()
        }
    }

    /// Build the commit message for `records`, skipping those `is_ignored` rejects.
    ///
    /// Every kept record contributes one pair, even when two records share
    /// a file name and summary.
    pub fn synthesize<F>(&self, records: &[ChangeRecord], mut is_ignored: F) -> CommitMessage
    where
        F: FnMut(&ChangeRecord) -> bool,
    {
        let mut message = CommitMessage::default();

        for record in records {
            if is_ignored(record) {
                debug!("Skipping ignored path {}", record.path);
                continue;
            }

            message.files.push(FileSummary {
                file_name: record.file_name().to_string(),
                summary: self.resolve_summary(record),
            });
        }

        message
    }

    fn exists_on_disk(&self, path: &str) -> bool {
        let path = Path::new(path);
        if path.is_absolute() {
            path.exists()
        } else {
            self.root.join(path).exists()
        }
    }
}
