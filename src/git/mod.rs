//! Git collaborator and working-tree change collection.

pub mod collector;
pub mod executor;
pub mod status;

pub use collector::ChangeSetCollector;
pub use executor::{GitCli, GitOutput, VersionControl, check_git_installed, locate_repository};
pub use status::{ChangeRecord, parse_name_status, parse_name_status_line, parse_status_short};
