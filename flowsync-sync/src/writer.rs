//! Atomic copy of a candidate onto the target path.
//!
//! ## `atomic_copy`: protocol
//!
//! 1. Ensure the target's parent directory exists.
//! 2. Copy source bytes and permissions to `<target>.flowsync.tmp`.
//! 3. Stamp the temp file with the source's access/modification times.
//! 4. Rename the temp file over the target (atomic on POSIX).
//!
//! Readers of the target only ever see the previous file or the new one.
//! On any failure the temp file is removed and the target is left untouched.

use std::path::{Path, PathBuf};

use filetime::FileTime;

use crate::error::{io_err, SyncError};

/// Suffix appended to the target path for the in-flight copy.
pub const TMP_SUFFIX: &str = ".flowsync.tmp";

/// Temp path used while copying onto `target`. Always a sibling of the target
/// so the final rename never crosses filesystems.
pub fn tmp_path_for(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(TMP_SUFFIX);
    target.with_file_name(name)
}

/// Copy `source` to `target`, replacing it atomically and preserving the
/// source's modification time.
pub fn atomic_copy(source: &Path, target: &Path) -> Result<(), SyncError> {
    let tmp = tmp_path_for(target);
    atomic_copy_with_tmp(source, target, &tmp)
}

fn atomic_copy_with_tmp(source: &Path, target: &Path, tmp: &Path) -> Result<(), SyncError> {
    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
            tracing::info!(dir = %parent.display(), "created target directory");
        }
    }

    if let Err(err) = copy_to_tmp(source, tmp) {
        let _ = std::fs::remove_file(tmp);
        return Err(err);
    }

    if let Err(e) = std::fs::rename(tmp, target) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(target, e));
    }

    tracing::debug!(
        source = %source.display(),
        target = %target.display(),
        "replaced target",
    );
    Ok(())
}

fn copy_to_tmp(source: &Path, tmp: &Path) -> Result<(), SyncError> {
    let metadata = std::fs::metadata(source).map_err(|e| io_err(source, e))?;
    std::fs::copy(source, tmp).map_err(|e| io_err(source, e))?;

    let atime = FileTime::from_last_access_time(&metadata);
    let mtime = FileTime::from_last_modification_time(&metadata);
    filetime::set_file_times(tmp, atime, mtime).map_err(|e| io_err(tmp, e))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
