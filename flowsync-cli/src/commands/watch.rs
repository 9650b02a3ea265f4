//! `flowsync watch`: run the sync monitor until Ctrl-C.

use anyhow::{Context, Result};
use clap::Args;

use flowsync_monitor::start_blocking;

use super::WatchOverrides;
use crate::LogFormatArg;

/// Arguments for `flowsync watch`.
#[derive(Args, Debug)]
pub struct WatchArgs {
    #[command(flatten)]
    pub watch: WatchOverrides,

    /// Log line format: text | json. `RUST_LOG` controls the level.
    #[arg(long, value_name = "FORMAT", default_value_t = LogFormatArg::default())]
    pub log_format: LogFormatArg,
}

impl WatchArgs {
    pub fn run(self) -> Result<()> {
        let config = self.watch.resolve()?;
        let stats =
            start_blocking(config, self.log_format.into()).context("monitor exited with error")?;
        println!(
            "monitor stopped after {} cycles ({} synced, {} failed)",
            stats.cycles, stats.syncs, stats.errors
        );
        Ok(())
    }
}
