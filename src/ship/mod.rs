//! Ship pipeline: commit the working tree and publish it.
//!
//! Steps run strictly in order and stop at the first hard failure:
//! branch check, status check, stage, synthesize, commit, pull, push.
//! Only the pull is allowed to fail; the push that follows surfaces any
//! real conflict. Nothing is rolled back on failure, so a run can leave
//! changes staged but uncommitted, or committed but unpushed.

pub mod preflight;

use std::path::Path;

use tracing::{debug, warn};

use crate::changelog::ChangeLogStore;
use crate::commit::SummarySynthesizer;
use crate::config::Config;
use crate::error::{GitError, ShipError};
use crate::git::{ChangeSetCollector, GitOutput, VersionControl};

use self::preflight::{check_branch, check_status, describe_failure};

/// How a ship run ended successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShipOutcome {
    /// The working tree was clean; nothing was staged or committed.
    NothingToCommit,
    /// Dry run: the message that would have been committed.
    DryRun { message: String },
    /// Committed and pushed.
    Shipped {
        branch: String,
        message: String,
        /// False when the pull before the push failed.
        synced: bool,
    },
}

/// Run the ship pipeline against `vcs`.
///
/// `root` is the working directory that git paths are relative to. With
/// `dry_run`, the message is synthesized from the short status listing
/// and nothing is staged, committed, or pushed.
pub fn run_ship<V: VersionControl + ?Sized>(
    vcs: &V,
    store: &ChangeLogStore,
    root: &Path,
    config: &Config,
    dry_run: bool,
) -> Result<ShipOutcome, ShipError> {
    // ── Step 1: Branch check ──
    let branch = check_branch(vcs, config)?;
    println!("Branch: {}", branch.branch);
    if !branch.allowed {
        println!(
            "  [WARN] {} is not a recommended branch ({}); continuing anyway",
            branch.branch,
            config.allowed_branches.join(" or ")
        );
    }

    // ── Step 2: Status check ──
    let status = check_status(vcs)?;
    if status.is_clean() {
        println!("Nothing to commit, working tree clean.");
        return Ok(ShipOutcome::NothingToCommit);
    }

    println!("Changes:");
    for line in &status.lines {
        println!("  {}", line);
    }

    let collector = ChangeSetCollector::new(vcs, store.file_name());
    let synthesizer = SummarySynthesizer::from_store(store, root);

    if dry_run {
        let message = synthesizer
            .synthesize(&status.records, |r| collector.is_ignored(&r.path))
            .format();
        println!();
        println!("Commit message: {}", message);
        println!("Dry run complete. No changes made.");
        return Ok(ShipOutcome::DryRun { message });
    }

    // ── Step 3: Stage ──
    require(vcs.stage_all(), ShipError::StageFailed)?;
    println!("  [DONE] Staged all changes");

    // ── Step 4: Synthesize ──
    let staged = collector.collect_staged_changes().map_err(|e| match e {
        GitError::CommandFailed { stderr, code, .. } => {
            ShipError::DiffFailed(describe_failure(&stderr, code))
        }
        other => ShipError::Git(other),
    })?;
    let message = synthesizer
        .synthesize(&staged, |r| collector.is_ignored(&r.path))
        .format();
    println!("  Commit message: {}", message);

    // ── Step 5: Commit ──
    require(vcs.commit(&message), ShipError::CommitFailed)?;
    println!("  [DONE] Committed");

    // ── Step 6: Sync with remote (non-fatal) ──
    let synced = match vcs.pull_no_rebase(&config.remote, &branch.branch) {
        Ok(output) if output.success => {
            println!("  [DONE] Pulled {}/{}", config.remote, branch.branch);
            true
        }
        Ok(output) => {
            let reason = describe_failure(&output.stderr, output.code);
            warn!("Pull failed: {}", reason);
            println!("  [WARN] Pull failed, pushing anyway: {}", reason);
            false
        }
        Err(e) => {
            warn!("Pull failed: {}", e);
            println!("  [WARN] Pull failed, pushing anyway: {}", e);
            false
        }
    };

    // ── Step 7: Push ──
    require(
        vcs.push(&config.remote, &branch.branch),
        ShipError::PushFailed,
    )?;
    println!("  [DONE] Pushed to {}/{}", config.remote, branch.branch);

    debug!("Ship complete on {}", branch.branch);
    Ok(ShipOutcome::Shipped {
        branch: branch.branch,
        message,
        synced,
    })
}

/// Treat a non-zero exit as the step's own failure.
fn require(
    result: Result<GitOutput, GitError>,
    fail: fn(String) -> ShipError,
) -> Result<GitOutput, ShipError> {
    let output = result?;
    if output.success {
        Ok(output)
    } else {
        Err(fail(describe_failure(&output.stderr, output.code)))
    }
}
