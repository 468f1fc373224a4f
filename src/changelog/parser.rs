//! Parse the records section of the update log.
//!
//! Parsing is lenient: a line that does not fit the entry grammar is
//! skipped, never reported.

use std::path::Path;
use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex_lite::Regex;

use crate::error::LogError;

use super::format::{LogEntry, Operation, RECORDS_HEADER, TIMESTAMP_FORMAT};

/// `[YYYY-MM-DD HH:MM:SS] 【label】 : path - summary`
///
/// The path is greedy so it runs up to the last ` - ` on the line.
static ENTRY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\[(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2})\] 【([^】]+)】 : (.+) - (.+)$",
    )
    .expect("Invalid regex")
});

/// An update log split around its records header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogDocument {
    /// Everything up to and including the header line's newline.
    pub head: String,
    /// Everything after the header line.
    pub records: String,
}

impl LogDocument {
    /// Split raw content at the first records header line.
    ///
    /// Returns `None` when no line equals the header.
    pub fn split(content: &str) -> Option<Self> {
        let mut offset = 0;
        for line in content.split_inclusive('\n') {
            let end = offset + line.len();
            if line.trim_end_matches(['\n', '\r']) == RECORDS_HEADER {
                let mut head = content[..end].to_string();
                if !head.ends_with('\n') {
                    head.push('\n');
                }
                return Some(Self {
                    head,
                    records: content[end..].to_string(),
                });
            }
            offset = end;
        }
        None
    }

    /// Parsed entries of the records section, in file order.
    pub fn entries(&self) -> Vec<LogEntry> {
        parse_records(&self.records)
    }

    /// Raw record lines with line endings stripped.
    pub fn record_lines(&self) -> impl Iterator<Item = &str> {
        self.records.lines().map(|l| l.trim_end_matches('\r'))
    }
}

/// Read the update log and split it into head and records.
pub fn read_log(path: &Path) -> Result<LogDocument, LogError> {
    if !path.exists() {
        return Err(LogError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path).map_err(LogError::ReadFailed)?;

    LogDocument::split(&content).ok_or_else(|| LogError::MissingSection {
        path: path.to_path_buf(),
        header: RECORDS_HEADER.to_string(),
    })
}

/// Parse every well-formed entry line, dropping the rest.
pub fn parse_records(records: &str) -> Vec<LogEntry> {
    records.lines().filter_map(parse_line).collect()
}

/// Parse one record line.
pub fn parse_line(line: &str) -> Option<LogEntry> {
    let caps = ENTRY_RE.captures(line.trim_end_matches('\r'))?;

    let timestamp = NaiveDateTime::parse_from_str(&caps[1], TIMESTAMP_FORMAT).ok()?;
    let operation = Operation::from_label(&caps[2])?;

    Some(LogEntry {
        timestamp,
        operation,
        path: caps[3].to_string(),
        summary: caps[4].to_string(),
    })
}

/// Summary of the newest entry whose path contains `file_name`.
///
/// Matching is plain substring containment on the whole path, so a
/// moved file keeps its history (and `app.js` also matches `myapp.js`).
/// On equal timestamps the entry nearest the top of the log wins.
pub fn latest_summary<'a>(entries: &'a [LogEntry], file_name: &str) -> Option<&'a str> {
    if file_name.is_empty() {
        return None;
    }

    let mut best: Option<&LogEntry> = None;
    for entry in entries.iter().filter(|e| e.path.contains(file_name)) {
        if best.is_none_or(|b| entry.timestamp > b.timestamp) {
            best = Some(entry);
        }
    }
    best.map(|e| e.summary.as_str())
}
