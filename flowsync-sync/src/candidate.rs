//! Source directory enumeration and candidate selection.
//!
//! Only regular files directly inside the source directory are considered,
//! and the pattern is matched against the file name alone; wildcards skip
//! hidden files. Among matches the
//! newest modification time wins; equal times fall back to the
//! lexicographically smallest file name so the choice never depends on
//! directory iteration order.

use std::cmp::Ordering;
use std::io::ErrorKind;
use std::path::Path;

use glob::MatchOptions;

use flowsync_core::Candidate;

use crate::error::{io_err, SyncError};

/// Wildcards never match a leading dot; hidden files need a literal `.`.
const NAME_MATCH: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: true,
};

/// Find the newest file in `dir` whose name matches `pattern`.
///
/// A missing directory yields `Ok(None)`. Entries that vanish or cannot be
/// stat'ed between listing and inspection are skipped. Any other failure to
/// read the directory is returned as [`SyncError::Io`].
pub fn find_candidate(dir: &Path, pattern: &glob::Pattern) -> Result<Option<Candidate>, SyncError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            tracing::debug!(dir = %dir.display(), "source directory missing");
            return Ok(None);
        }
        Err(err) => return Err(io_err(dir, err)),
    };

    let mut matches = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::debug!(dir = %dir.display(), error = %err, "skipping unreadable entry");
                continue;
            }
        };

        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        if !pattern.matches_with(name, NAME_MATCH) {
            continue;
        }

        let path = entry.path();
        // Follows symlinks, so a linked export counts as a regular file.
        let metadata = match std::fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "skipping entry without metadata");
                continue;
            }
        };
        if !metadata.is_file() {
            continue;
        }
        let modified = metadata.modified().map_err(|e| io_err(&path, e))?;

        matches.push(Candidate {
            path,
            file_name: name.to_string(),
            modified,
        });
    }

    Ok(select_newest(matches))
}

/// Pick the candidate with the greatest modification time, ties broken by
/// the smallest file name.
pub fn select_newest(candidates: impl IntoIterator<Item = Candidate>) -> Option<Candidate> {
    candidates
        .into_iter()
        .reduce(|best, next| match next.modified.cmp(&best.modified) {
            Ordering::Greater => next,
            Ordering::Equal if next.file_name < best.file_name => next,
            _ => best,
        })
}
