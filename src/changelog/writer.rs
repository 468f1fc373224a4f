//! Prepend new entries to the update log.

use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::LogError;

use super::format::LogEntry;
use super::parser::{LogDocument, read_log};

/// Result of an append.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppendOutcome {
    /// Lines written, in the order they now appear at the top of the records.
    pub added: Vec<String>,
    /// Candidates that already existed verbatim.
    pub duplicates: usize,
}

impl AppendOutcome {
    /// True when every candidate was a duplicate and the file was left alone.
    pub fn is_unchanged(&self) -> bool {
        self.added.is_empty()
    }
}

/// Compute the new log content with `entries` placed above the existing records.
///
/// A candidate is dropped when an identical line already exists anywhere in
/// the records section, or earlier in the same batch. New lines reuse the
/// header line's ending. Returns `None` when nothing would change.
pub fn prepend_entries(doc: &LogDocument, entries: &[LogEntry]) -> (Option<String>, AppendOutcome) {
    let lines: Vec<String> = entries.iter().map(LogEntry::to_line).collect();
    let mut seen: HashSet<&str> = doc.record_lines().collect();
    let mut outcome = AppendOutcome::default();

    for line in &lines {
        if seen.insert(line.as_str()) {
            outcome.added.push(line.clone());
        } else {
            outcome.duplicates += 1;
        }
    }

    if outcome.is_unchanged() {
        return (None, outcome);
    }

    let newline = if doc.head.ends_with("\r\n") { "\r\n" } else { "\n" };
    let mut content = String::with_capacity(
        doc.head.len()
            + doc.records.len()
            + outcome.added.iter().map(|l| l.len() + newline.len()).sum::<usize>(),
    );
    content.push_str(&doc.head);
    for line in &outcome.added {
        content.push_str(line);
        content.push_str(newline);
    }
    content.push_str(&doc.records);

    (Some(content), outcome)
}

/// Read the log, prepend `entries`, and replace the file in one step.
///
/// The new content goes to a temporary file next to the log which is then
/// renamed over it. Another process writing the log between the read and
/// the rename loses its update.
pub fn append_entries(path: &Path, entries: &[LogEntry]) -> Result<AppendOutcome, LogError> {
    let doc = read_log(path)?;
    let (content, outcome) = prepend_entries(&doc, entries);

    let Some(content) = content else {
        debug!("All {} candidate entries already logged", outcome.duplicates);
        return Ok(outcome);
    };

    write_atomically(path, &content)?;
    debug!(
        "Prepended {} entries to {} ({} duplicates skipped)",
        outcome.added.len(),
        path.display(),
        outcome.duplicates
    );

    Ok(outcome)
}

fn write_atomically(path: &Path, content: &str) -> Result<(), LogError> {
    // Resolve symlinks so the rename lands on the real file, not the link.
    let target = fs::canonicalize(path).map_err(LogError::WriteFailed)?;
    let permissions = fs::metadata(&target)
        .map_err(LogError::WriteFailed)?
        .permissions();
    let dir = target.parent().unwrap_or_else(|| Path::new("."));

    let mut tmp = NamedTempFile::new_in(dir).map_err(LogError::WriteFailed)?;
    tmp.write_all(content.as_bytes())
        .map_err(LogError::WriteFailed)?;
    // Temp files are created 0600; carry the log's own mode over.
    tmp.as_file()
        .set_permissions(permissions)
        .map_err(LogError::WriteFailed)?;
    tmp.as_file().sync_all().map_err(LogError::WriteFailed)?;
    tmp.persist(&target)
        .map_err(|e| LogError::WriteFailed(e.error))?;

    Ok(())
}
