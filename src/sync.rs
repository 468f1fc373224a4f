//! Record working-tree changes in the update log.

use chrono::NaiveDateTime;
use tracing::debug;

use crate::changelog::{ChangeLogStore, LogEntry};
use crate::error::{LogError, SyncError};
use crate::git::{ChangeRecord, ChangeSetCollector, VersionControl};

/// What a sync run did to the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The working tree has no changes.
    NoChanges,
    /// Every observed change was ignored or already logged.
    NothingNew { duplicates: usize },
    /// New lines prepended to the records section.
    Added(Vec<String>),
}

/// Build one log entry per record, all stamped with `timestamp`.
///
/// The summary is the status-derived default phrase.
pub fn build_entries(records: &[ChangeRecord], timestamp: NaiveDateTime) -> Vec<LogEntry> {
    records
        .iter()
        .map(|r| LogEntry::new(timestamp, r.status, r.path.clone(), r.status.default_summary()))
        .collect()
}

/// Collect working-tree changes and prepend the new ones to the update log.
///
/// The log must exist before git is queried. Ignored paths and the log
/// itself are never recorded.
pub fn sync_log<V: VersionControl + ?Sized>(
    vcs: &V,
    store: &ChangeLogStore,
    timestamp: NaiveDateTime,
) -> Result<SyncOutcome, SyncError> {
    if !store.exists() {
        return Err(LogError::NotFound(store.path().to_path_buf()).into());
    }

    let collector = ChangeSetCollector::new(vcs, store.file_name());
    let records = collector.collect_working_tree()?;
    if records.is_empty() {
        return Ok(SyncOutcome::NoChanges);
    }

    let relevant = collector.retain_relevant(records);
    debug!("{} changes left after ignore filtering", relevant.len());

    let entries = build_entries(&relevant, timestamp);
    let outcome = store.append_entries(&entries)?;

    if outcome.is_unchanged() {
        Ok(SyncOutcome::NothingNew {
            duplicates: outcome.duplicates,
        })
    } else {
        Ok(SyncOutcome::Added(outcome.added))
    }
}
