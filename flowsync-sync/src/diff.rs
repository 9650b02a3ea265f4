//! Unified diff between the target and the newest candidate, for `flowsync diff`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use similar::TextDiff;

use flowsync_core::{Candidate, WatchConfig};

use crate::{candidate::find_candidate, error::io_err, SyncError};

/// Difference between what the target holds and what the next sync would
/// write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDiff {
    pub target: PathBuf,
    pub candidate: Candidate,
    pub unified_diff: String,
}

/// Compare the target with the newest candidate. No files are written.
///
/// Returns `None` when there is no candidate or the contents are identical.
/// A missing target diffs as empty.
pub fn diff_target(config: &WatchConfig) -> Result<Option<TargetDiff>, SyncError> {
    config.validate()?;
    let pattern = config.pattern()?;
    let Some(candidate) = find_candidate(&config.source_directory, &pattern)? else {
        return Ok(None);
    };

    let existing = read_existing_or_empty(&config.target_file)?;
    let incoming = read_existing_or_empty(&candidate.path)?;
    if existing == incoming {
        return Ok(None);
    }

    let target_name = config
        .target_file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let old_header = format!("a/{target_name}");
    let new_header = format!("b/{}", candidate.file_name);
    let unified_diff = TextDiff::from_lines(&existing, &incoming)
        .unified_diff()
        .header(&old_header, &new_header)
        .context_radius(3)
        .to_string();

    Ok(Some(TargetDiff {
        target: config.target_file.clone(),
        candidate,
        unified_diff,
    }))
}

fn read_existing_or_empty(path: &Path) -> Result<String, SyncError> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).replace("\r\n", "\n")),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(err) => Err(io_err(path, err)),
    }
}
