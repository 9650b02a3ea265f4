//! `flowsync sync`: run one poll cycle and report the outcome.

use anyhow::{Context, Result};
use clap::Args;

use flowsync_core::{CycleOutcome, WatchConfig};
use flowsync_sync::pipeline;

use super::WatchOverrides;

/// Arguments for `flowsync sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Show what would be copied without touching any file.
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub watch: WatchOverrides,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let config = self.watch.resolve()?;
        let outcome = pipeline::run_once(config.clone(), self.dry_run).context("sync failed")?;
        print_outcome(&config, &outcome, self.dry_run);
        Ok(())
    }
}

fn print_outcome(config: &WatchConfig, outcome: &CycleOutcome, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    match outcome {
        CycleOutcome::NoCandidate => println!(
            "{prefix}No files matching '{}' in {}",
            config.match_pattern,
            config.source_directory.display()
        ),
        CycleOutcome::UpToDate { candidate } => {
            println!("{prefix}✓ target is up to date with '{candidate}'")
        }
        CycleOutcome::Synced { candidate } => {
            println!("✓ synced '{candidate}'");
            println!("  ✎  {}", config.target_file.display());
        }
        CycleOutcome::WouldSync { candidate } => {
            println!("{prefix}would sync '{candidate}'");
            println!("  ~  {}", config.target_file.display());
        }
    }
}
