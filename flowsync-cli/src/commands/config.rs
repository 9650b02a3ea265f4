//! `flowsync config show`: print the effective watch configuration.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use flowsync_core::WatchConfig;

use super::WatchOverrides;

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the configuration after applying file and flag overrides.
    Show(ShowArgs),
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub watch: WatchOverrides,
}

#[derive(Serialize)]
struct ConfigJson {
    source_directory: String,
    target_file: String,
    match_pattern: String,
    poll_interval_ms: u128,
    error_backoff_ms: u128,
    debounce_margin_ms: u128,
}

impl From<&WatchConfig> for ConfigJson {
    fn from(config: &WatchConfig) -> Self {
        Self {
            source_directory: config.source_directory.display().to_string(),
            target_file: config.target_file.display().to_string(),
            match_pattern: config.match_pattern.clone(),
            poll_interval_ms: config.poll_interval.as_millis(),
            error_backoff_ms: config.error_backoff.as_millis(),
            debounce_margin_ms: config.debounce_margin.as_millis(),
        }
    }
}

#[derive(Tabled)]
struct ConfigRow {
    #[tabled(rename = "key")]
    key: &'static str,
    #[tabled(rename = "value")]
    value: String,
}

pub fn run(command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Show(args) => {
            let config = args.watch.resolve()?;
            let payload = ConfigJson::from(&config);
            if args.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&payload)
                        .context("failed to serialize config JSON")?
                );
                return Ok(());
            }

            let rows = vec![
                ConfigRow {
                    key: "source_directory",
                    value: payload.source_directory,
                },
                ConfigRow {
                    key: "target_file",
                    value: payload.target_file,
                },
                ConfigRow {
                    key: "match_pattern",
                    value: payload.match_pattern,
                },
                ConfigRow {
                    key: "poll_interval_ms",
                    value: payload.poll_interval_ms.to_string(),
                },
                ConfigRow {
                    key: "error_backoff_ms",
                    value: payload.error_backoff_ms.to_string(),
                },
                ConfigRow {
                    key: "debounce_margin_ms",
                    value: payload.debounce_margin_ms.to_string(),
                },
            ];
            let mut table = Table::new(rows);
            table.with(Style::rounded());
            println!("{table}");
        }
    }
    Ok(())
}
