//! Error types for flowsync-backup.

use std::path::PathBuf;

use thiserror::Error;

/// Hard failures of a backup run. Each one stops the run at the step that
/// failed; earlier steps are not rolled back.
#[derive(Debug, Error)]
pub enum BackupError {
    /// The directory is not inside a git work tree.
    #[error("not a git repository: {path}")]
    NotARepository { path: PathBuf },

    /// `git checkout -b` failed, or no free branch name was left.
    #[error("failed to create branch '{branch}': {diagnostic}")]
    BranchCreation { branch: String, diagnostic: String },

    /// `git add .` failed.
    #[error("failed to stage changes: {diagnostic}")]
    Staging { diagnostic: String },

    /// `git commit` failed for a reason other than an empty index.
    #[error("commit failed: {diagnostic}")]
    Commit { diagnostic: String },

    /// Any other git command returned an unexpected status.
    #[error("`git {command}` failed: {diagnostic}")]
    Command { command: String, diagnostic: String },

    /// The git binary could not be started.
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}
