//! Update log entry types and line formatting.

use std::fmt;

use chrono::NaiveDateTime;

/// Header line that opens the records section of the update log.
pub const RECORDS_HEADER: &str = "## 更新记录";

/// Timestamp layout inside the square brackets of an entry.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The kind of change an entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Added,
    Deleted,
    Modified,
    Renamed,
    Copied,
}

impl Operation {
    /// Map a git status code to an operation.
    ///
    /// Only the first character matters (`R100` is a rename). Anything
    /// unrecognized counts as a modification.
    pub fn from_status(code: &str) -> Self {
        match code.chars().next() {
            Some('A') => Self::Added,
            Some('D') => Self::Deleted,
            Some('R') => Self::Renamed,
            Some('C') => Self::Copied,
            _ => Self::Modified,
        }
    }

    /// Single-letter git status code.
    pub fn code(&self) -> char {
        match self {
            Self::Added => 'A',
            Self::Deleted => 'D',
            Self::Modified => 'M',
            Self::Renamed => 'R',
            Self::Copied => 'C',
        }
    }

    /// Label written between 【】 in the log.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Added => "新增文件",
            Self::Deleted => "删除文件",
            Self::Modified => "修改文件",
            Self::Renamed => "重命名文件",
            Self::Copied => "复制文件",
        }
    }

    /// Reverse of [`Operation::label`].
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "新增文件" => Some(Self::Added),
            "删除文件" => Some(Self::Deleted),
            "修改文件" => Some(Self::Modified),
            "重命名文件" => Some(Self::Renamed),
            "复制文件" => Some(Self::Copied),
            _ => None,
        }
    }

    /// Summary used when a new entry is recorded without a human note.
    ///
    /// Copies have no phrase of their own and read as modifications.
    pub fn default_summary(&self) -> &'static str {
        match self {
            Self::Added => "新增文件",
            Self::Deleted => "删除文件",
            Self::Renamed => "重命名文件",
            Self::Modified | Self::Copied => "修改文件",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One record line of the update log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: NaiveDateTime,
    pub operation: Operation,
    /// Repository-relative path.
    pub path: String,
    pub summary: String,
}

impl LogEntry {
    pub fn new(
        timestamp: NaiveDateTime,
        operation: Operation,
        path: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            operation,
            path: path.into(),
            summary: summary.into(),
        }
    }

    /// Render the entry as a single log line (no trailing newline).
    ///
    /// Line breaks in the summary are flattened to spaces so one entry
    /// always stays on one line.
    pub fn to_line(&self) -> String {
        let summary: String = self
            .summary
            .chars()
            .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
            .collect();
        format!(
            "[{}] 【{}】 : {} - {}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.operation.label(),
            self.path,
            summary
        )
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_line())
    }
}
