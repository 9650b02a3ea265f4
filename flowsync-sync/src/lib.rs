//! # flowsync-sync
//!
//! Candidate selection, atomic copy and the single poll cycle.
//!
//! [`SyncMonitor::start`] performs the startup contract and
//! [`SyncMonitor::poll_once`] runs exactly one cycle; the indefinitely running
//! loop lives in `flowsync-monitor`. [`pipeline::run_once`] is the one-shot
//! entrypoint used by `flowsync sync`.

pub mod candidate;
pub mod diff;
pub mod error;
pub mod monitor;
pub mod pipeline;
pub mod state;
pub mod status;
pub mod writer;

pub use diff::{diff_target, TargetDiff};
pub use error::SyncError;
pub use monitor::SyncMonitor;
pub use state::SyncState;
pub use status::{check, SyncSignal};
