//! `flowsync backup [--repo DIR]`: commit the working tree to a new
//! `backup/YYYY-MM-DD-HH-MM` branch.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Args;
use colored::Colorize;

use flowsync_backup::{run_backup, BackupOutcome, SystemGit};

/// Arguments for `flowsync backup`.
#[derive(Args, Debug)]
pub struct BackupArgs {
    /// Repository working directory (defaults to the current directory).
    #[arg(long, value_name = "DIR")]
    pub repo: Option<PathBuf>,
}

impl BackupArgs {
    pub fn run(self) -> Result<()> {
        let repo = match self.repo {
            Some(repo) => repo,
            None => std::env::current_dir().context("could not determine current directory")?,
        };

        let outcome = run_backup(&SystemGit::new(), &repo, &Local::now())
            .with_context(|| format!("backup failed for '{}'", repo.display()))?;

        match outcome {
            BackupOutcome::Committed {
                branch,
                message,
                summary,
            } => {
                println!("{} backed up to '{}'", "✓".green().bold(), branch);
                println!("  {message}");
                if !summary.is_empty() {
                    println!("  {}", summary.bright_black());
                }
            }
            BackupOutcome::NoChanges { branch } => {
                println!(
                    "{} no changes to commit; created branch '{}'",
                    "·".bright_black(),
                    branch
                );
            }
        }
        Ok(())
    }
}
