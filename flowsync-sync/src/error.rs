//! Error types for flowsync-sync.

use std::path::PathBuf;

use thiserror::Error;

use flowsync_core::ConfigError;

/// All errors that can arise from a poll cycle or a one-shot inspection.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The watch configuration was rejected.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
