//! Domain types shared by the sync engine, the monitor runtime and the CLI.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.

use std::fmt;
use std::path::PathBuf;
use std::time::SystemTime;

// ---------------------------------------------------------------------------
// Candidate
// ---------------------------------------------------------------------------

/// The newest file in the source directory matching the watch pattern.
///
/// Derived on every poll; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Full path inside the source directory.
    pub path: PathBuf,
    /// File name component, used for tie-breaking and notices.
    pub file_name: String,
    /// Modification time read during enumeration.
    pub modified: SystemTime,
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.file_name.fmt(f)
    }
}

// ---------------------------------------------------------------------------
// Cycle outcome
// ---------------------------------------------------------------------------

/// Result of a single poll cycle that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Nothing in the source directory matches the pattern.
    NoCandidate,
    /// The newest match is not newer than the last sync plus the debounce margin.
    UpToDate { candidate: Candidate },
    /// The candidate was copied to the target.
    Synced { candidate: Candidate },
    /// Dry-run only: the candidate would have been copied.
    WouldSync { candidate: Candidate },
}

impl CycleOutcome {
    pub fn candidate(&self) -> Option<&Candidate> {
        match self {
            CycleOutcome::NoCandidate => None,
            CycleOutcome::UpToDate { candidate }
            | CycleOutcome::Synced { candidate }
            | CycleOutcome::WouldSync { candidate } => Some(candidate),
        }
    }

    pub fn is_synced(&self) -> bool {
        matches!(self, CycleOutcome::Synced { .. })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
