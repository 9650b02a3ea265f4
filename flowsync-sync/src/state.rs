//! Process-local sync state: the modification time of the last file copied.

use std::io::ErrorKind;
use std::path::Path;
use std::time::{Duration, SystemTime};

use crate::error::{io_err, SyncError};

/// Memory of the last successful sync.
///
/// `None` means "never synced" and orders below every real timestamp.
/// `last_synced` never moves backwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncState {
    last_synced: Option<SystemTime>,
}

impl SyncState {
    pub fn never_synced() -> Self {
        Self { last_synced: None }
    }

    pub fn synced_at(time: SystemTime) -> Self {
        Self {
            last_synced: Some(time),
        }
    }

    /// Seed from the target's modification time, or "never synced" when the
    /// target does not exist yet.
    pub fn seed_from_target(target: &Path) -> Result<Self, SyncError> {
        match std::fs::metadata(target) {
            Ok(metadata) => {
                let modified = metadata.modified().map_err(|e| io_err(target, e))?;
                Ok(Self::synced_at(modified))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Self::never_synced()),
            Err(err) => Err(io_err(target, err)),
        }
    }

    pub fn last_synced(&self) -> Option<SystemTime> {
        self.last_synced
    }

    /// A file modified at `modified` needs copying when it is strictly newer
    /// than the last sync plus `margin`.
    pub fn is_due(&self, modified: SystemTime, margin: Duration) -> bool {
        match self.last_synced {
            None => true,
            Some(last) => match last.checked_add(margin) {
                Some(threshold) => modified > threshold,
                None => false,
            },
        }
    }

    /// Record a successful copy of a file modified at `modified`.
    pub fn record(&mut self, modified: SystemTime) {
        self.last_synced = Some(match self.last_synced {
            Some(last) if last > modified => last,
            _ => modified,
        });
    }
}
