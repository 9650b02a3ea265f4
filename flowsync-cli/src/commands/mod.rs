pub mod backup;
pub mod config;
pub mod diff;
pub mod init;
pub mod status;
pub mod sync;
pub mod watch;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;

use flowsync_core::{config as config_file, ConfigFile, WatchConfig};

/// Watch configuration flags shared by every command that reads it.
///
/// Precedence: these flags, then the config file, then built-in defaults.
/// Relative paths resolve against the current directory.
#[derive(Args, Debug, Default, Clone)]
pub struct WatchOverrides {
    /// Config file to read instead of ~/.flowsync/config.yaml.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory scanned for exports.
    #[arg(long, value_name = "DIR")]
    pub source: Option<PathBuf>,

    /// File the newest export is copied to.
    #[arg(long, value_name = "FILE")]
    pub target: Option<PathBuf>,

    /// File name pattern, e.g. "flow-*.json".
    #[arg(long, value_name = "GLOB")]
    pub pattern: Option<String>,

    #[arg(long, value_name = "MS")]
    pub poll_interval_ms: Option<u64>,

    #[arg(long, value_name = "MS")]
    pub error_backoff_ms: Option<u64>,

    #[arg(long = "debounce-ms", value_name = "MS")]
    pub debounce_margin_ms: Option<u64>,
}

impl WatchOverrides {
    /// Build the effective, validated [`WatchConfig`].
    pub fn resolve(&self) -> Result<WatchConfig> {
        let base = std::env::current_dir().context("could not determine current directory")?;
        let file = self.load_file()?;
        let config = self.apply(&base, config_file::resolve(&base, file.as_ref()));
        config.validate().context("invalid watch configuration")?;
        Ok(config)
    }

    fn load_file(&self) -> Result<Option<ConfigFile>> {
        if let Some(path) = &self.config {
            let loaded = config_file::load_from(path)
                .with_context(|| format!("failed to load config '{}'", path.display()))?;
            if loaded.is_none() {
                bail!("config file not found: {}", path.display());
            }
            return Ok(loaded);
        }
        config_file::load().context("failed to load ~/.flowsync/config.yaml")
    }

    fn apply(&self, base: &Path, mut config: WatchConfig) -> WatchConfig {
        if let Some(source) = &self.source {
            config.source_directory = base.join(source);
        }
        if let Some(target) = &self.target {
            config.target_file = base.join(target);
        }
        if let Some(pattern) = &self.pattern {
            config.match_pattern = pattern.clone();
        }
        if let Some(ms) = self.poll_interval_ms {
            config.poll_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = self.error_backoff_ms {
            config.error_backoff = Duration::from_millis(ms);
        }
        if let Some(ms) = self.debounce_margin_ms {
            config.debounce_margin = Duration::from_millis(ms);
        }
        config
    }
}
