//! Backup run: new branch, stage everything, commit.
//!
//! Steps, stopping at the first hard failure without rollback:
//! 1. `git rev-parse --is-inside-work-tree` must print `true`.
//! 2. Pick `backup/YYYY-MM-DD-HH-MM`, suffixed `-2`, `-3`, … if taken.
//! 3. `git checkout -b <branch>`.
//! 4. `git add .`.
//! 5. `git diff --cached --quiet`: exit 0 means nothing staged.
//! 6. `git commit -m "Auto backup at YYYY-MM-DD HH:MM"`.

use std::path::Path;

use chrono::{DateTime, TimeZone};

use crate::error::BackupError;
use crate::git::{GitOutput, GitRunner};

/// Highest numeric suffix tried before giving up on a free branch name.
const MAX_BRANCH_SUFFIX: u32 = 99;

/// Successful backup results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupOutcome {
    /// A commit with all working-directory changes was created.
    Committed {
        branch: String,
        message: String,
        summary: String,
    },
    /// The branch was created but there was nothing to commit.
    NoChanges { branch: String },
}

impl BackupOutcome {
    pub fn branch(&self) -> &str {
        match self {
            BackupOutcome::Committed { branch, .. } | BackupOutcome::NoChanges { branch } => branch,
        }
    }
}

/// `backup/2024-01-02-15-04`
pub fn backup_branch_name<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("backup/{}", now.format("%Y-%m-%d-%H-%M"))
}

/// `Auto backup at 2024-01-02 15:04`
pub fn commit_message<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("Auto backup at {}", now.format("%Y-%m-%d %H:%M"))
}

/// Snapshot `repo` into a new backup branch stamped with `now`.
pub fn run_backup<R, Tz>(runner: &R, repo: &Path, now: &DateTime<Tz>) -> Result<BackupOutcome, BackupError>
where
    R: GitRunner + ?Sized,
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    ensure_work_tree(runner, repo)?;

    let branch = free_branch_name(runner, repo, &backup_branch_name(now))?;
    tracing::info!(branch = %branch, "creating backup branch");

    let checkout = runner.run(repo, &["checkout", "-b", &branch])?;
    if !checkout.success {
        return Err(BackupError::BranchCreation {
            branch,
            diagnostic: checkout.diagnostic(),
        });
    }

    let add = runner.run(repo, &["add", "."])?;
    if !add.success {
        return Err(BackupError::Staging {
            diagnostic: add.diagnostic(),
        });
    }

    let staged = runner.run(repo, &["diff", "--cached", "--quiet"])?;
    match staged.code {
        Some(0) => {
            tracing::info!(branch = %branch, "no changes to commit");
            return Ok(BackupOutcome::NoChanges { branch });
        }
        Some(1) => {}
        _ => {
            return Err(BackupError::Command {
                command: "diff --cached --quiet".to_string(),
                diagnostic: staged.diagnostic(),
            })
        }
    }

    let message = commit_message(now);
    let commit = runner.run(repo, &["commit", "-m", &message])?;
    if !commit.success {
        return Err(BackupError::Commit {
            diagnostic: commit.diagnostic(),
        });
    }

    tracing::info!(branch = %branch, "backup committed");
    Ok(BackupOutcome::Committed {
        branch,
        message,
        summary: first_line(&commit),
    })
}

fn ensure_work_tree<R: GitRunner + ?Sized>(runner: &R, repo: &Path) -> Result<(), BackupError> {
    let output = runner.run(repo, &["rev-parse", "--is-inside-work-tree"])?;
    if output.success && output.stdout.trim() == "true" {
        return Ok(());
    }
    tracing::debug!(diagnostic = %output.diagnostic(), "work tree check failed");
    Err(BackupError::NotARepository {
        path: repo.to_path_buf(),
    })
}

fn free_branch_name<R: GitRunner + ?Sized>(
    runner: &R,
    repo: &Path,
    base: &str,
) -> Result<String, BackupError> {
    for n in 1..=MAX_BRANCH_SUFFIX {
        let candidate = if n == 1 {
            base.to_string()
        } else {
            format!("{base}-{n}")
        };
        let reference = format!("refs/heads/{candidate}");
        let exists = runner
            .run(repo, &["show-ref", "--verify", "--quiet", &reference])?
            .success;
        if !exists {
            return Ok(candidate);
        }
    }
    Err(BackupError::BranchCreation {
        branch: base.to_string(),
        diagnostic: format!("branches up to suffix -{MAX_BRANCH_SUFFIX} already exist"),
    })
}

fn first_line(output: &GitOutput) -> String {
    output
        .stdout
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default()
        .to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
