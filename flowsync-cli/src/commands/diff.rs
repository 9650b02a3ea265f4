//! `flowsync diff`: show the unified diff of what the next sync would write.

use anyhow::{Context, Result};
use clap::Args;

use flowsync_sync::diff_target;

use super::WatchOverrides;

/// Arguments for `flowsync diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    #[command(flatten)]
    pub watch: WatchOverrides,
}

impl DiffArgs {
    pub fn run(self) -> Result<()> {
        let config = self.watch.resolve()?;
        let diff = diff_target(&config).context("diff failed")?;

        let Some(diff) = diff else {
            println!("No differences for '{}'.", config.target_file.display());
            return Ok(());
        };

        print!("{}", diff.unified_diff);
        if !diff.unified_diff.ends_with('\n') {
            println!();
        }
        Ok(())
    }
}
