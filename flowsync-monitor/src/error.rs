use std::path::PathBuf;

use thiserror::Error;

/// Errors that stop the monitor. Poll cycle failures never surface here;
/// they are logged and retried after the error backoff.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("startup failed: {0}")]
    Startup(#[from] flowsync_sync::SyncError),
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> MonitorError {
    MonitorError::Io {
        path: path.into(),
        source,
    }
}
