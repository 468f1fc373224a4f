//! Commit messages synthesized from the update log.

pub mod message;

pub use message::{CommitMessage, FileSummary, SummarySynthesizer};
