//! Watch configuration and the optional YAML config file.
//!
//! # Storage layout
//!
//! ```text
//! ~/.flowsync/
//!   config.yaml   (optional: mode 0600, written by `flowsync init`)
//! ```
//!
//! # API pattern
//!
//! File functions come in two forms:
//! - `fn_at(home: &Path, …)`: explicit home; used in tests with `TempDir`
//! - `fn(…)`: derives home from `dirs::home_dir()`, delegates to `_at`
//!
//! Precedence when building a [`WatchConfig`]: CLI flags, then the config
//! file, then the built-in defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{io_err, ConfigError};

pub const DEFAULT_SOURCE_DIR: &str = "LocalStorage_Flow";
pub const DEFAULT_TARGET_FILE: &str = "public/data/complete-business-flow.json";
pub const DEFAULT_MATCH_PATTERN: &str = "flow-*.json";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
pub const DEFAULT_ERROR_BACKOFF: Duration = Duration::from_secs(5);
pub const DEFAULT_DEBOUNCE_MARGIN: Duration = Duration::from_secs(1);

pub const CONFIG_FILE: &str = "config.yaml";

// ---------------------------------------------------------------------------
// 1. WatchConfig
// ---------------------------------------------------------------------------

/// Immutable description of what the sync monitor watches and where it copies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchConfig {
    pub source_directory: PathBuf,
    pub target_file: PathBuf,
    pub match_pattern: String,
    pub poll_interval: Duration,
    pub error_backoff: Duration,
    pub debounce_margin: Duration,
}

impl WatchConfig {
    /// Explicit source and target, defaults for everything else.
    pub fn new(source_directory: impl Into<PathBuf>, target_file: impl Into<PathBuf>) -> Self {
        Self {
            source_directory: source_directory.into(),
            target_file: target_file.into(),
            match_pattern: DEFAULT_MATCH_PATTERN.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            error_backoff: DEFAULT_ERROR_BACKOFF,
            debounce_margin: DEFAULT_DEBOUNCE_MARGIN,
        }
    }

    /// Built-in default paths resolved against `base`.
    pub fn defaults_in(base: &Path) -> Self {
        Self::new(base.join(DEFAULT_SOURCE_DIR), base.join(DEFAULT_TARGET_FILE))
    }

    pub fn with_match_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.match_pattern = pattern.into();
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_error_backoff(mut self, backoff: Duration) -> Self {
        self.error_backoff = backoff;
        self
    }

    pub fn with_debounce_margin(mut self, margin: Duration) -> Self {
        self.debounce_margin = margin;
        self
    }

    /// Compile `match_pattern` into a filename matcher.
    pub fn pattern(&self) -> Result<glob::Pattern, ConfigError> {
        glob::Pattern::new(&self.match_pattern).map_err(|source| ConfigError::InvalidPattern {
            pattern: self.match_pattern.clone(),
            source,
        })
    }

    /// Reject values the monitor cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.match_pattern.contains('/') || self.match_pattern.contains('\\') {
            return Err(ConfigError::Invalid(format!(
                "match pattern '{}' must match file names, not paths",
                self.match_pattern
            )));
        }
        self.pattern()?;
        if self.poll_interval.is_zero() {
            return Err(ConfigError::Invalid(
                "poll interval must be greater than zero".to_string(),
            ));
        }
        if self.target_file.file_name().is_none() {
            return Err(ConfigError::Invalid(format!(
                "target '{}' does not name a file",
                self.target_file.display()
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// 2. Config file
// ---------------------------------------------------------------------------

/// On-disk config payload. Every field is optional; absent fields fall back
/// to the built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_directory: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_interval_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_backoff_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debounce_margin_ms: Option<u64>,
}

impl ConfigFile {
    /// Fully populated file mirroring `config`.
    pub fn from_config(config: &WatchConfig) -> Self {
        Self {
            source_directory: Some(config.source_directory.clone()),
            target_file: Some(config.target_file.clone()),
            match_pattern: Some(config.match_pattern.clone()),
            poll_interval_ms: Some(duration_ms(config.poll_interval)),
            error_backoff_ms: Some(duration_ms(config.error_backoff)),
            debounce_margin_ms: Some(duration_ms(config.debounce_margin)),
        }
    }

    /// Overlay the fields present in this file onto `config`.
    ///
    /// Relative paths resolve against `base`.
    pub fn apply(&self, base: &Path, mut config: WatchConfig) -> WatchConfig {
        if let Some(source) = &self.source_directory {
            config.source_directory = base.join(source);
        }
        if let Some(target) = &self.target_file {
            config.target_file = base.join(target);
        }
        if let Some(pattern) = &self.match_pattern {
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

/// Defaults in `base`, overlaid with `file` when present.
pub fn resolve(base: &Path, file: Option<&ConfigFile>) -> WatchConfig {
    let defaults = WatchConfig::defaults_in(base);
    match file {
        Some(file) => file.apply(base, defaults),
        None => defaults,
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

// ---------------------------------------------------------------------------
// 3. Load / save
// ---------------------------------------------------------------------------

/// `<home>/.flowsync/`
pub fn config_dir_at(home: &Path) -> PathBuf {
    home.join(".flowsync")
}

/// `<home>/.flowsync/config.yaml`: pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    config_dir_at(home).join(CONFIG_FILE)
}

/// `config_path_at` for the current user's home.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    Ok(config_path_at(&home()?))
}

/// Load the config file under `home`.
///
/// Returns `Ok(None)` when no file exists, `ConfigError::Parse` when malformed.
pub fn load_at(home: &Path) -> Result<Option<ConfigFile>, ConfigError> {
    let path = config_path_at(home);
    load_from(&path)
}

/// Load a config file from an explicit path.
pub fn load_from(path: &Path) -> Result<Option<ConfigFile>, ConfigError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(io_err(path, err)),
    };
    if contents.trim().is_empty() {
        return Ok(Some(ConfigFile::default()));
    }
    serde_yaml::from_str(&contents)
        .map(Some)
        .map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<Option<ConfigFile>, ConfigError> {
    load_at(&home()?)
}

/// Atomically save `file` to `<home>/.flowsync/config.yaml`.
///
/// Write flow: serialize → `config.yaml.tmp` sibling → `chmod 0600` → `rename`.
pub fn save_at(home: &Path, file: &ConfigFile) -> Result<PathBuf, ConfigError> {
    let dir = config_dir_at(home);
    std::fs::create_dir_all(&dir).map_err(|e| io_err(&dir, e))?;

    let path = config_path_at(home);
    let tmp = dir.join(format!("{CONFIG_FILE}.tmp"));
    let yaml = serde_yaml::to_string(file)?;
    std::fs::write(&tmp, yaml).map_err(|e| io_err(&tmp, e))?;
    set_file_permissions(&tmp)?;
    if let Err(err) = std::fs::rename(&tmp, &path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(&path, err));
    }
    Ok(path)
}

/// `save_at` convenience wrapper.
pub fn save(file: &ConfigFile) -> Result<PathBuf, ConfigError> {
    save_at(&home()?, file)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| io_err(path, e))
}

#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
