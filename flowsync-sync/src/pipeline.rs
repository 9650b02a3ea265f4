//! One-shot sync entrypoint used by `flowsync sync`.

use flowsync_core::{CycleOutcome, WatchConfig};

use crate::{SyncError, SyncMonitor};

/// Run a single poll cycle against the target's current state.
///
/// The sync state is seeded from the target exactly as at monitor startup,
/// so a one-shot run never re-copies what a previous run already synced.
/// `dry_run` skips every filesystem change, including creating the source
/// directory.
pub fn run_once(config: WatchConfig, dry_run: bool) -> Result<CycleOutcome, SyncError> {
    if dry_run {
        SyncMonitor::open(config)?.preview()
    } else {
        SyncMonitor::start(config)?.poll_once()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn empty_source_reports_no_candidate() {
        let root = TempDir::new().expect("root");
        let config = WatchConfig::defaults_in(root.path());
        let outcome = run_once(config.clone(), false).expect("run");
        assert_eq!(outcome, CycleOutcome::NoCandidate);
        assert!(config.source_directory.is_dir());
        assert!(!config.target_file.exists());
    }

    #[test]
    fn second_run_is_up_to_date() {
        let root = TempDir::new().expect("root");
        let config = WatchConfig::defaults_in(root.path());
        fs::create_dir_all(&config.source_directory).expect("mkdir");
        fs::write(config.source_directory.join("flow-1.json"), "{}").expect("write");

        assert!(run_once(config.clone(), false).expect("first").is_synced());
        let second = run_once(config, false).expect("second");
        assert!(matches!(second, CycleOutcome::UpToDate { .. }));
    }

    #[test]
    fn dry_run_leaves_filesystem_alone() {
        let root = TempDir::new().expect("root");
        let config = WatchConfig::defaults_in(root.path());
        let outcome = run_once(config.clone(), true).expect("run");
        assert_eq!(outcome, CycleOutcome::NoCandidate);
        assert!(!config.source_directory.exists());
    }
}
