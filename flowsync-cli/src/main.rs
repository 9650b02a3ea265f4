//! flowsync: keep a published flow file in step with the newest export,
//! and snapshot a working tree into a backup branch.
//!
//! # Usage
//!
//! ```text
//! flowsync init [--force]
//! flowsync watch [--source DIR] [--target FILE] [--pattern GLOB] [--log-format text|json]
//! flowsync sync [--dry-run]
//! flowsync status [--json]
//! flowsync diff
//! flowsync backup [--repo DIR]
//! flowsync config show [--json]
//! ```
//!
//! Every command that reads the watch configuration also accepts
//! `--config FILE`, `--poll-interval-ms`, `--error-backoff-ms` and
//! `--debounce-ms`.

mod commands;

use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    backup::BackupArgs, config::ConfigCommand, diff::DiffArgs, init::InitArgs,
    status::StatusArgs, sync::SyncArgs, watch::WatchArgs,
};
use flowsync_monitor::LogFormat;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "flowsync",
    version,
    about = "Mirror the newest flow export into a fixed target file",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default config file to ~/.flowsync/config.yaml.
    Init(InitArgs),

    /// Poll the source directory and copy every newer export to the target.
    Watch(WatchArgs),

    /// Run a single poll cycle and report what happened.
    Sync(SyncArgs),

    /// Show whether the target matches the newest export.
    Status(StatusArgs),

    /// Show a unified diff of what the next sync would write.
    Diff(DiffArgs),

    /// Commit the working tree to a new timestamped backup branch.
    Backup(BackupArgs),

    /// Inspect the effective configuration.
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

// ---------------------------------------------------------------------------
// Shared LogFormat argument
// ---------------------------------------------------------------------------

/// Thin wrapper so clap can parse `LogFormat` from CLI args.
#[derive(Debug, Clone, Default)]
pub struct LogFormatArg(pub LogFormat);

impl FromStr for LogFormatArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self(LogFormat::Text)),
            "json" => Ok(Self(LogFormat::Json)),
            other => Err(format!("unknown log format '{other}'; expected: text, json")),
        }
    }
}

impl fmt::Display for LogFormatArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            LogFormat::Text => f.write_str("text"),
            LogFormat::Json => f.write_str("json"),
        }
    }
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        arg.0
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Init(args) => args.run(),
        Commands::Watch(args) => args.run(),
        Commands::Sync(args) => args.run(),
        Commands::Status(args) => args.run(),
        Commands::Diff(args) => args.run(),
        Commands::Backup(args) => args.run(),
        Commands::Config { command } => commands::config::run(command),
    }
}
