//! Sync monitor runtime: the cancellable periodic poll loop.

mod error;
mod runtime;

pub use error::MonitorError;
pub use runtime::{
    init_tracing, run, start_blocking, LogFormat, MonitorRuntime, MonitorState, MonitorStats,
};
