//! # flowsync-backup
//!
//! Snapshot a git working directory into a new timestamped branch.
//!
//! [`run_backup`] talks to git only through the [`GitRunner`] capability, so
//! it can be exercised against a scripted fake; [`SystemGit`] is the real
//! implementation that spawns the `git` binary.

pub mod backup;
pub mod error;
pub mod git;

pub use backup::{backup_branch_name, commit_message, run_backup, BackupOutcome};
pub use error::BackupError;
pub use git::{GitOutput, GitRunner, SystemGit};
