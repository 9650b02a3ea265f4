//! `flowsync status`: is the target in step with the newest export?

use std::time::SystemTime;

use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use flowsync_core::WatchConfig;
use flowsync_sync::{check, SyncSignal, SyncState};

use super::WatchOverrides;

/// Arguments for `flowsync status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub watch: WatchOverrides,
}

impl StatusArgs {
    pub fn run(self) -> Result<()> {
        let config = self.watch.resolve()?;
        let signal = check(&config).context("status check failed")?;
        let last_synced = SyncState::seed_from_target(&config.target_file)
            .context("failed to read target metadata")?
            .last_synced();

        if self.json {
            print_json(&config, &signal, last_synced)?;
        } else {
            print_table(&config, &signal, last_synced);
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct StatusJson {
    status: &'static str,
    detail: String,
    source_directory: String,
    target_file: String,
    match_pattern: String,
    candidate: Option<String>,
    candidate_modified_at: Option<String>,
    last_synced_at: Option<String>,
}

#[derive(Tabled)]
struct StatusTableRow {
    #[tabled(rename = "field")]
    field: &'static str,
    #[tabled(rename = "value")]
    value: String,
}

fn print_json(
    config: &WatchConfig,
    signal: &SyncSignal,
    last_synced: Option<SystemTime>,
) -> Result<()> {
    let candidate = signal.candidate();
    let payload = StatusJson {
        status: signal_key(signal),
        detail: signal_detail(signal),
        source_directory: config.source_directory.display().to_string(),
        target_file: config.target_file.display().to_string(),
        match_pattern: config.match_pattern.clone(),
        candidate: candidate.map(|c| c.file_name.clone()),
        candidate_modified_at: candidate.map(|c| rfc3339(c.modified)),
        last_synced_at: last_synced.map(rfc3339),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize status JSON")?
    );
    Ok(())
}

fn print_table(config: &WatchConfig, signal: &SyncSignal, last_synced: Option<SystemTime>) {
    println!(
        "flowsync v{} | {} {}",
        env!("CARGO_PKG_VERSION"),
        signal_indicator(signal),
        signal_label(signal),
    );

    let rows = vec![
        StatusTableRow {
            field: "source",
            value: config.source_directory.display().to_string(),
        },
        StatusTableRow {
            field: "pattern",
            value: config.match_pattern.clone(),
        },
        StatusTableRow {
            field: "target",
            value: config.target_file.display().to_string(),
        },
        StatusTableRow {
            field: "newest export",
            value: signal
                .candidate()
                .map(|c| format!("{c} ({})", format_age(c.modified)))
                .unwrap_or_else(|| "none".to_string()),
        },
        StatusTableRow {
            field: "last sync",
            value: last_synced
                .map(format_age)
                .unwrap_or_else(|| "never".to_string()),
        },
        StatusTableRow {
            field: "detail",
            value: signal_detail(signal),
        },
    ];
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    if matches!(
        signal,
        SyncSignal::NeverSynced { .. } | SyncSignal::Pending { .. } | SyncSignal::Modified { .. }
    ) {
        println!("Run 'flowsync sync' to copy the newest export.");
    }
}

fn signal_key(signal: &SyncSignal) -> &'static str {
    match signal {
        SyncSignal::NoCandidate => "no_candidate",
        SyncSignal::NeverSynced { .. } => "never_synced",
        SyncSignal::Pending { .. } => "pending",
        SyncSignal::Modified { .. } => "modified",
        SyncSignal::Current { .. } => "current",
    }
}

fn signal_label(signal: &SyncSignal) -> &'static str {
    match signal {
        SyncSignal::NoCandidate => "NO EXPORTS",
        SyncSignal::NeverSynced { .. } => "NEVER SYNCED",
        SyncSignal::Pending { .. } => "PENDING",
        SyncSignal::Modified { .. } => "MODIFIED",
        SyncSignal::Current { .. } => "CURRENT",
    }
}

fn signal_indicator(signal: &SyncSignal) -> String {
    match signal {
        SyncSignal::NoCandidate => "■".bright_black().bold().to_string(),
        SyncSignal::NeverSynced { .. } => "■".bright_black().bold().to_string(),
        SyncSignal::Pending { .. } => "■".yellow().bold().to_string(),
        SyncSignal::Modified { .. } => "■".red().bold().to_string(),
        SyncSignal::Current { .. } => "■".green().bold().to_string(),
    }
}

fn signal_detail(signal: &SyncSignal) -> String {
    match signal {
        SyncSignal::NoCandidate => "no matching files in source directory".to_string(),
        SyncSignal::NeverSynced { candidate } => {
            format!("target missing; '{candidate}' will be copied")
        }
        SyncSignal::Pending { candidate } => format!("'{candidate}' is newer than the target"),
        SyncSignal::Modified { candidate } => {
            format!("target content differs from '{candidate}'")
        }
        SyncSignal::Current { .. } => "up to date".to_string(),
    }
}

fn rfc3339(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).to_rfc3339()
}

fn format_age(time: SystemTime) -> String {
    let then = DateTime::<Local>::from(time);
    let secs = Local::now().signed_duration_since(then).num_seconds().max(0);
    let age = match secs {
        0..=59 => format!("{secs}s ago"),
        60..=3_599 => format!("{}m ago", secs / 60),
        3_600..=86_399 => format!("{}h ago", secs / 3_600),
        _ => format!("{}d ago", secs / 86_400),
    };
    format!("{} · {age}", then.format("%Y-%m-%d %H:%M:%S"))
}
