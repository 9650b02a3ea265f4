//! Target status classification for `flowsync status`.
//!
//! Signal precedence:
//! 1. `NoCandidate` (nothing in the source directory matches)
//! 2. `NeverSynced` (target file missing)
//! 3. `Pending` (the next poll cycle would copy the candidate)
//! 4. `Modified` (target content differs from the candidate although no sync
//!    is due, e.g. edited by hand)
//! 5. `Current`

use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};

use flowsync_core::{Candidate, WatchConfig};

use crate::candidate::find_candidate;
use crate::error::{io_err, SyncError};
use crate::state::SyncState;

/// Classification of the target relative to the newest candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncSignal {
    NoCandidate,
    NeverSynced { candidate: Candidate },
    Pending { candidate: Candidate },
    Modified { candidate: Candidate },
    Current { candidate: Candidate },
}

impl SyncSignal {
    pub fn candidate(&self) -> Option<&Candidate> {
        match self {
            SyncSignal::NoCandidate => None,
            SyncSignal::NeverSynced { candidate }
            | SyncSignal::Pending { candidate }
            | SyncSignal::Modified { candidate }
            | SyncSignal::Current { candidate } => Some(candidate),
        }
    }
}

/// Classify the target described by `config`. Read-only.
pub fn check(config: &WatchConfig) -> Result<SyncSignal, SyncError> {
    config.validate()?;
    let pattern = config.pattern()?;

    let Some(candidate) = find_candidate(&config.source_directory, &pattern)? else {
        return Ok(SyncSignal::NoCandidate);
    };

    let state = SyncState::seed_from_target(&config.target_file)?;
    if state.last_synced().is_none() {
        return Ok(SyncSignal::NeverSynced { candidate });
    }
    if state.is_due(candidate.modified, config.debounce_margin) {
        return Ok(SyncSignal::Pending { candidate });
    }

    if file_digest(&config.target_file)? != file_digest(&candidate.path)? {
        return Ok(SyncSignal::Modified { candidate });
    }
    Ok(SyncSignal::Current { candidate })
}

/// Hex-encoded SHA-256 of a file's bytes.
pub fn file_digest(path: &Path) -> Result<String, SyncError> {
    let mut file = std::fs::File::open(path).map_err(|e| io_err(path, e))?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let read = file.read(&mut buf).map_err(|e| io_err(path, e))?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::{Duration, UNIX_EPOCH};

    use filetime::{set_file_mtime, FileTime};
    use tempfile::TempDir;

    use crate::writer::atomic_copy;

    const BASE: u64 = 1_700_000_000;

    fn write_at(path: &Path, content: &str, secs: u64) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
        let when = UNIX_EPOCH + Duration::from_secs(secs);
        set_file_mtime(path, FileTime::from_system_time(when)).unwrap();
    }

    fn setup() -> (TempDir, WatchConfig) {
        let root = TempDir::new().unwrap();
        let config = WatchConfig::defaults_in(root.path());
        (root, config)
    }

    #[test]
    fn no_candidate_when_source_empty() {
        let (_root, config) = setup();
        assert_eq!(check(&config).unwrap(), SyncSignal::NoCandidate);
    }

    #[test]
    fn never_synced_when_target_missing() {
        let (_root, config) = setup();
        write_at(&config.source_directory.join("flow-1.json"), "{}", BASE);
        assert!(matches!(check(&config).unwrap(), SyncSignal::NeverSynced { .. }));
    }

    #[test]
    fn current_after_copy() {
        let (_root, config) = setup();
        let source = config.source_directory.join("flow-1.json");
        write_at(&source, "{\"a\":1}", BASE);
        atomic_copy(&source, &config.target_file).unwrap();
        assert!(matches!(check(&config).unwrap(), SyncSignal::Current { .. }));
    }

    #[test]
    fn pending_when_newer_export_arrives() {
        let (_root, config) = setup();
        write_at(&config.target_file, "old", BASE);
        write_at(&config.source_directory.join("flow-2.json"), "new", BASE + 10);
        match check(&config).unwrap() {
            SyncSignal::Pending { candidate } => assert_eq!(candidate.file_name, "flow-2.json"),
            other => panic!("expected pending, got {other:?}"),
        }
    }

    #[test]
    fn modified_when_target_edited_in_place() {
        let (_root, config) = setup();
        write_at(&config.source_directory.join("flow-1.json"), "exported", BASE);
        write_at(&config.target_file, "edited by hand", BASE + 1);
        assert!(matches!(check(&config).unwrap(), SyncSignal::Modified { .. }));
    }

    #[test]
    fn digest_is_content_based() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        fs::write(&a, "same").unwrap();
        fs::write(&b, "same").unwrap();
        assert_eq!(file_digest(&a).unwrap(), file_digest(&b).unwrap());
        assert_eq!(file_digest(&a).unwrap().len(), 64);
    }
}
