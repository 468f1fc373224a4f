//! logship - keeps an append-only update log and ships commits summarized from it.
//!
//! # Overview
//!
//! `sync` records working-tree changes as new lines at the top of the
//! update log (`UPDATE_LOG.md`). `ship` stages everything, builds a commit
//! message from each changed file's latest log summary, commits, pulls,
//! and pushes.

pub mod changelog;
pub mod commit;
pub mod config;
pub mod error;
pub mod git;
pub mod ship;
pub mod sync;

// Re-export commonly used types
pub use changelog::{ChangeLogStore, LogEntry, Operation};
pub use commit::{CommitMessage, SummarySynthesizer};
pub use config::Config;
pub use error::{GitError, LogError, ShipError, SyncError};
pub use git::{ChangeRecord, ChangeSetCollector, GitCli, VersionControl};
pub use ship::{ShipOutcome, run_ship};
pub use sync::{SyncOutcome, sync_log};
