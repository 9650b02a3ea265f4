//! The sync monitor: startup contract plus a single, synchronous poll cycle.
//!
//! Scheduling (sleeps, backoff, cancellation) is the caller's job; see the
//! `flowsync-monitor` runtime. Keeping the cycle synchronous lets tests
//! single-step it without timers.

use std::path::Path;

use flowsync_core::{CycleOutcome, WatchConfig};

use crate::candidate;
use crate::error::{io_err, SyncError};
use crate::state::SyncState;
use crate::writer;

#[derive(Debug)]
pub struct SyncMonitor {
    config: WatchConfig,
    pattern: glob::Pattern,
    state: SyncState,
}

impl SyncMonitor {
    /// Validate `config` and seed the sync state from the target, without
    /// touching the filesystem otherwise.
    pub fn open(config: WatchConfig) -> Result<Self, SyncError> {
        config.validate()?;
        let pattern = config.pattern()?;
        let state = SyncState::seed_from_target(&config.target_file)?;
        Ok(Self {
            config,
            pattern,
            state,
        })
    }

    /// Startup contract: create the source directory if absent, seed the
    /// sync state and emit the startup notice.
    pub fn start(config: WatchConfig) -> Result<Self, SyncError> {
        config.validate()?;
        ensure_source_dir(&config.source_directory)?;
        let monitor = Self::open(config)?;
        tracing::info!(
            source = %monitor.config.source_directory.display(),
            target = %monitor.config.target_file.display(),
            pattern = %monitor.config.match_pattern,
            "monitoring started",
        );
        Ok(monitor)
    }

    pub fn config(&self) -> &WatchConfig {
        &self.config
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Run one poll cycle: find the newest match and copy it onto the target
    /// when it is newer than the last sync plus the debounce margin.
    pub fn poll_once(&mut self) -> Result<CycleOutcome, SyncError> {
        let Some(candidate) =
            candidate::find_candidate(&self.config.source_directory, &self.pattern)?
        else {
            return Ok(CycleOutcome::NoCandidate);
        };

        if !self
            .state
            .is_due(candidate.modified, self.config.debounce_margin)
        {
            return Ok(CycleOutcome::UpToDate { candidate });
        }

        tracing::info!(file = %candidate.file_name, "detected new file");
        writer::atomic_copy(&candidate.path, &self.config.target_file)?;
        self.state.record(candidate.modified);
        tracing::info!(
            file = %candidate.file_name,
            target = %self.config.target_file.display(),
            "synced",
        );

        Ok(CycleOutcome::Synced { candidate })
    }

    /// Like [`poll_once`](Self::poll_once) but never writes; a due sync is
    /// reported as [`CycleOutcome::WouldSync`].
    pub fn preview(&self) -> Result<CycleOutcome, SyncError> {
        let Some(candidate) =
            candidate::find_candidate(&self.config.source_directory, &self.pattern)?
        else {
            return Ok(CycleOutcome::NoCandidate);
        };

        if self
            .state
            .is_due(candidate.modified, self.config.debounce_margin)
        {
            tracing::info!("[dry-run] would sync: {}", candidate.file_name);
            Ok(CycleOutcome::WouldSync { candidate })
        } else {
            Ok(CycleOutcome::UpToDate { candidate })
        }
    }
}

fn ensure_source_dir(dir: &Path) -> Result<(), SyncError> {
    if dir.exists() {
        return Ok(());
    }
    std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
    tracing::info!(dir = %dir.display(), "created source directory");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    use filetime::{set_file_mtime, FileTime};
    use tempfile::TempDir;

    const BASE: u64 = 1_700_000_000;

    fn at(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    fn write_at(path: &Path, content: &str, secs: u64) {
        fs::write(path, content).unwrap();
        set_file_mtime(path, FileTime::from_system_time(at(secs))).unwrap();
    }

    struct Fixture {
        _root: TempDir,
        source: PathBuf,
        target: PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let root = TempDir::new().unwrap();
            let source = root.path().join("LocalStorage_Flow");
            let target = root.path().join("public").join("data").join("flow.json");
            Self {
                _root: root,
                source,
                target,
            }
        }

        fn config(&self) -> WatchConfig {
            WatchConfig::new(&self.source, &self.target)
        }

        fn export(&self, name: &str, content: &str, secs: u64) {
            write_at(&self.source.join(name), content, secs);
        }
    }

    #[test]
    fn start_creates_source_directory() {
        let fx = Fixture::new();
        assert!(!fx.source.exists());
        SyncMonitor::start(fx.config()).unwrap();
        assert!(fx.source.is_dir());
    }

    #[test]
    fn open_does_not_create_source_directory() {
        let fx = Fixture::new();
        SyncMonitor::open(fx.config()).unwrap();
        assert!(!fx.source.exists());
    }

    #[test]
    fn start_rejects_invalid_config() {
        let fx = Fixture::new();
        let err = SyncMonitor::start(fx.config().with_match_pattern("flow-[.json")).unwrap_err();
        assert!(matches!(err, SyncError::Config(_)));
        assert!(!fx.source.exists(), "rejected config must not create the source directory");
    }

    #[test]
    fn empty_source_creates_no_target() {
        let fx = Fixture::new();
        let mut monitor = SyncMonitor::start(fx.config()).unwrap();
        for _ in 0..3 {
            assert_eq!(monitor.poll_once().unwrap(), CycleOutcome::NoCandidate);
        }
        assert!(!fx.target.exists());
        assert_eq!(monitor.state().last_synced(), None);
    }

    #[test]
    fn newest_file_is_synced_exactly_once() {
        let fx = Fixture::new();
        let mut monitor = SyncMonitor::start(fx.config()).unwrap();
        fx.export("flow-20240101.json", "day one", BASE);

        let first = monitor.poll_once().unwrap();
        assert!(first.is_synced());
        assert_eq!(fs::read_to_string(&fx.target).unwrap(), "day one");

        fx.export("flow-20240102.json", "day two", BASE + 5);
        let second = monitor.poll_once().unwrap();
        match &second {
            CycleOutcome::Synced { candidate } => {
                assert_eq!(candidate.file_name, "flow-20240102.json")
            }
            other => panic!("expected sync, got {other:?}"),
        }
        assert_eq!(fs::read_to_string(&fx.target).unwrap(), "day two");

        let third = monitor.poll_once().unwrap();
        assert!(matches!(third, CycleOutcome::UpToDate { .. }));
        assert_eq!(monitor.state().last_synced(), Some(at(BASE + 5)));
    }

    #[test]
    fn target_keeps_candidate_mtime() {
        let fx = Fixture::new();
        let mut monitor = SyncMonitor::start(fx.config()).unwrap();
        fx.export("flow-a.json", "{}", BASE);
        monitor.poll_once().unwrap();
        assert_eq!(fs::metadata(&fx.target).unwrap().modified().unwrap(), at(BASE));
    }

    #[test]
    fn preexisting_target_suppresses_files_within_margin() {
        let fx = Fixture::new();
        fs::create_dir_all(fx.target.parent().unwrap()).unwrap();
        write_at(&fx.target, "published", BASE);
        fs::create_dir_all(&fx.source).unwrap();
        fx.export("flow-a.json", "within margin", BASE + 1);

        let mut monitor = SyncMonitor::start(fx.config()).unwrap();
        let outcome = monitor.poll_once().unwrap();
        assert!(matches!(outcome, CycleOutcome::UpToDate { .. }));
        assert_eq!(fs::read_to_string(&fx.target).unwrap(), "published");

        fx.export("flow-b.json", "beyond margin", BASE + 2);
        assert!(monitor.poll_once().unwrap().is_synced());
        assert_eq!(fs::read_to_string(&fx.target).unwrap(), "beyond margin");
    }

    #[test]
    fn restart_after_sync_does_not_recopy() {
        let fx = Fixture::new();
        let mut monitor = SyncMonitor::start(fx.config()).unwrap();
        fx.export("flow-a.json", "once", BASE);
        assert!(monitor.poll_once().unwrap().is_synced());
        drop(monitor);

        let mut restarted = SyncMonitor::start(fx.config()).unwrap();
        assert_eq!(restarted.state().last_synced(), Some(at(BASE)));
        assert!(matches!(
            restarted.poll_once().unwrap(),
            CycleOutcome::UpToDate { .. }
        ));
    }

    #[test]
    fn unreadable_source_is_an_error_then_recovers() {
        let fx = Fixture::new();
        let mut monitor = SyncMonitor::start(fx.config()).unwrap();

        fs::remove_dir(&fx.source).unwrap();
        fs::write(&fx.source, "not a directory").unwrap();
        assert!(monitor.poll_once().is_err());

        fs::remove_file(&fx.source).unwrap();
        fs::create_dir_all(&fx.source).unwrap();
        fx.export("flow-a.json", "recovered", BASE);
        assert!(monitor.poll_once().unwrap().is_synced());
        assert_eq!(fs::read_to_string(&fx.target).unwrap(), "recovered");
    }

    #[test]
    fn preview_never_writes() {
        let fx = Fixture::new();
        fs::create_dir_all(&fx.source).unwrap();
        fx.export("flow-a.json", "{}", BASE);

        let monitor = SyncMonitor::open(fx.config()).unwrap();
        let outcome = monitor.preview().unwrap();
        assert!(matches!(outcome, CycleOutcome::WouldSync { .. }));
        assert!(!fx.target.exists());
        assert_eq!(monitor.state().last_synced(), None);
    }
}
