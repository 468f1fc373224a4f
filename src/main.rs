//! logship - CLI entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use logship::changelog::ChangeLogStore;
use logship::config::Config;
use logship::git::{GitCli, check_git_installed, locate_repository};
use logship::ship::{ShipOutcome, run_ship};
use logship::sync::{SyncOutcome, sync_log};

/// Keep the update log current and ship commits summarized from it.
#[derive(Parser, Debug)]
#[command(name = "logship")]
#[command(about = "Keep UPDATE_LOG.md current and ship commits summarized from it")]
#[command(version)]
struct Cli {
    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record working-tree changes at the top of the update log
    Sync,

    /// Stage, commit, pull, and push with a message built from the update log
    Ship {
        /// Print the commit message without staging, committing, or pushing
        #[arg(long)]
        dry_run: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Sync => {
            // Sync never fails the process; problems are reported only.
            if let Err(e) = run_sync_command() {
                eprintln!("Error: {:#}", e);
            }
            ExitCode::SUCCESS
        }
        Command::Ship { dry_run } => match run_ship_command(dry_run) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error: {:#}", e);
                ExitCode::FAILURE
            }
        },
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Repository root, or the current directory when not inside a repository.
fn resolve_root() -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("Could not read the current directory")?;
    Ok(locate_repository(&cwd).unwrap_or(cwd))
}

fn run_sync_command() -> Result<()> {
    println!("==== Sync update log ====");

    check_git_installed()?;
    let config = Config::from_env();
    let root = resolve_root()?;
    let store = ChangeLogStore::new(config.log_path(&root));
    let git = GitCli::new(&root);

    let outcome = sync_log(&git, &store, config.now())
        .with_context(|| format!("Failed to update {}", store.path().display()))?;

    match outcome {
        SyncOutcome::NoChanges => println!("No changes found."),
        SyncOutcome::NothingNew { .. } => println!("No new changes to record."),
        SyncOutcome::Added(lines) => {
            for line in &lines {
                println!("  {}", line);
            }
            println!(
                "✓ Added {} {} to {}",
                lines.len(),
                if lines.len() == 1 { "entry" } else { "entries" },
                store.path().display()
            );
        }
    }

    Ok(())
}

fn run_ship_command(dry_run: bool) -> Result<()> {
    println!("==== Ship ====");

    check_git_installed()?;
    let config = Config::from_env();
    let root = resolve_root()?;
    let store = ChangeLogStore::new(config.log_path(&root));
    let git = GitCli::new(&root);

    let outcome = run_ship(&git, &store, &root, &config, dry_run)?;

    if let ShipOutcome::Shipped { branch, .. } = outcome {
        println!();
        println!("✓ Shipped to {}/{}", config.remote, branch);
    }

    Ok(())
}
