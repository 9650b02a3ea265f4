//! `flowsync init [--force]`

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Args;

use flowsync_core::{config, ConfigFile, WatchConfig};

/// Write a default config file.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing config file.
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        let path = config::config_path().context("could not locate config file")?;
        if path.exists() && !self.force {
            bail!(
                "config already exists at {}; pass --force to overwrite",
                path.display()
            );
        }

        // Relative defaults keep the file usable from any project directory.
        let file = ConfigFile::from_config(&WatchConfig::defaults_in(Path::new("")));
        let saved = config::save(&file)
            .with_context(|| format!("failed to write {}", path.display()))?;

        println!("✓ Wrote default config");
        println!("  Saved to: {}", saved.display());
        Ok(())
    }
}
