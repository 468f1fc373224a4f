//! Working-tree change records and `--name-status` parsing.

use std::path::Path;

use crate::changelog::Operation;

/// One observed change in the working tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    pub status: Operation,
    /// Repository-relative path; for renames and copies, the new path.
    pub path: String,
}

impl ChangeRecord {
    pub fn new(status: Operation, path: impl Into<String>) -> Self {
        Self {
            status,
            path: path.into(),
        }
    }

    /// Base name of the path.
    pub fn file_name(&self) -> &str {
        file_name_of(&self.path)
    }
}

/// Base name of a repository-relative path.
pub fn file_name_of(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path)
}

/// Parse one `git diff --name-status` line.
///
/// The status field ends at the first tab. Renames appear either as
/// `R100\told\tnew` or as `R\told -> new`; only the new path is kept.
pub fn parse_name_status_line(line: &str) -> Option<ChangeRecord> {
    let (code, rest) = line.split_once('\t')?;
    let rest = rest.trim_end_matches('\r');

    let path = match rest.rsplit_once('\t') {
        Some((_, new)) => new,
        None => match rest.split_once(" -> ") {
            Some((_, new)) => new,
            None => rest,
        },
    };

    if path.is_empty() {
        return None;
    }

    Some(ChangeRecord::new(Operation::from_status(code.trim()), path))
}

/// Parse every line of `--name-status` output, in order.
pub fn parse_name_status(output: &str) -> Vec<ChangeRecord> {
    output.lines().filter_map(parse_name_status_line).collect()
}

/// Parse one `git status --short` line (`XY path` or `XY old -> new`).
///
/// Untracked files (`??`) are additions; otherwise the first non-blank
/// status column decides.
pub fn parse_status_short_line(line: &str) -> Option<ChangeRecord> {
    let codes = line.get(..2)?;
    let rest = line.get(3..)?.trim_end_matches('\r');

    let path = rest.split_once(" -> ").map_or(rest, |(_, new)| new);
    let path = path.trim_matches('"');
    if path.is_empty() {
        return None;
    }

    let status = if codes == "??" {
        Operation::Added
    } else {
        Operation::from_status(codes.trim_start())
    };

    Some(ChangeRecord::new(status, path))
}

/// Parse every line of `--short` status output, in order.
pub fn parse_status_short(output: &str) -> Vec<ChangeRecord> {
    output.lines().filter_map(parse_status_short_line).collect()
}
