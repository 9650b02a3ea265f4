//! flowsync core library: watch configuration, config file persistence,
//! shared domain types and errors.
//!
//! - [`config`]: [`WatchConfig`] and the optional YAML config file
//! - [`types`]: [`Candidate`] and [`CycleOutcome`]
//! - [`error`]: [`ConfigError`]

pub mod config;
pub mod error;
pub mod types;

pub use config::{ConfigFile, WatchConfig};
pub use error::ConfigError;
pub use types::{Candidate, CycleOutcome};
