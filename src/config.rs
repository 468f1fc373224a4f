//! Runtime configuration read from environment variables.

use std::env;
use std::path::PathBuf;

use chrono::{FixedOffset, NaiveDateTime, Offset, Timelike, Utc};
use tracing::warn;

/// Default update log file name, relative to the repository root.
pub const DEFAULT_LOG_FILE: &str = "UPDATE_LOG.md";

/// Default remote used for pull and push.
pub const DEFAULT_REMOTE: &str = "origin";

/// Branches that ship without a warning.
pub const DEFAULT_BRANCHES: &[&str] = &["main", "master"];

/// Default offset for new log timestamps (Beijing time).
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = 8;

const LOG_FILE_ENV_VAR: &str = "LOGSHIP_LOG_FILE";
const REMOTE_ENV_VAR: &str = "LOGSHIP_REMOTE";
const BRANCHES_ENV_VAR: &str = "LOGSHIP_BRANCHES";
const UTC_OFFSET_ENV_VAR: &str = "LOGSHIP_UTC_OFFSET";

/// Settings shared by both entry points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Update log path, relative to the repository root unless absolute.
    pub log_file: PathBuf,
    pub remote: String,
    /// Empty means any branch is accepted silently.
    pub allowed_branches: Vec<String>,
    pub utc_offset_hours: i32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            remote: DEFAULT_REMOTE.to_string(),
            allowed_branches: DEFAULT_BRANCHES.iter().map(|b| b.to_string()).collect(),
            utc_offset_hours: DEFAULT_UTC_OFFSET_HOURS,
        }
    }
}

impl Config {
    /// Build the configuration from `LOGSHIP_*` environment variables.
    ///
    /// Unset or empty variables keep their defaults. Invalid values are
    /// logged and replaced by the default.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(path) = non_empty_var(LOG_FILE_ENV_VAR) {
            config.log_file = PathBuf::from(path);
        }

        if let Some(remote) = non_empty_var(REMOTE_ENV_VAR) {
            config.remote = remote;
        }

        // Set-but-empty disables the branch warning entirely.
        if let Ok(branches) = env::var(BRANCHES_ENV_VAR) {
            config.allowed_branches = branches
                .split(',')
                .map(str::trim)
                .filter(|b| !b.is_empty())
                .map(String::from)
                .collect();
        }

        if let Some(raw) = non_empty_var(UTC_OFFSET_ENV_VAR) {
            match raw.trim().parse::<i32>() {
                Ok(hours) if (-12..=14).contains(&hours) => config.utc_offset_hours = hours,
                _ => warn!(
                    "Invalid {} value '{}', using default {}",
                    UTC_OFFSET_ENV_VAR, raw, DEFAULT_UTC_OFFSET_HOURS
                ),
            }
        }

        config
    }

    /// Resolve the update log path against the repository root.
    pub fn log_path(&self, root: &std::path::Path) -> PathBuf {
        if self.log_file.is_absolute() {
            self.log_file.clone()
        } else {
            root.join(&self.log_file)
        }
    }

    /// Whether `branch` is on the allow-list (always true for an empty list).
    pub fn is_allowed_branch(&self, branch: &str) -> bool {
        self.allowed_branches.is_empty() || self.allowed_branches.iter().any(|b| b == branch)
    }

    /// Current wall-clock time in the configured offset, second resolution.
    pub fn now(&self) -> NaiveDateTime {
        let offset = FixedOffset::east_opt(self.utc_offset_hours * 3600)
            .unwrap_or_else(|| Utc.fix());
        let local = Utc::now().with_timezone(&offset).naive_local();
        local.with_nanosecond(0).unwrap_or(local)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
