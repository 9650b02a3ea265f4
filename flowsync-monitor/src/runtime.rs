use std::future::Future;
use std::time::Duration;

use tokio::sync::broadcast;

use flowsync_core::WatchConfig;
use flowsync_sync::SyncMonitor;

use crate::error::{io_err, MonitorError};

/// Which wait the loop is in between two poll cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    /// Last cycle succeeded; waiting out `poll_interval`.
    IdlePoll,
    /// Last cycle failed; waiting out `error_backoff`.
    ErrorBackoff,
}

/// Counters reported when the loop stops.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonitorStats {
    pub cycles: u64,
    pub syncs: u64,
    pub errors: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// The poll loop around a started [`SyncMonitor`].
///
/// [`step`](Self::step) runs exactly one cycle and returns the delay before
/// the next one, so tests can single-step without timers.
/// [`run_until`](Self::run_until) drives the steps until a shutdown future
/// resolves.
#[derive(Debug)]
pub struct MonitorRuntime {
    monitor: SyncMonitor,
    state: MonitorState,
    stats: MonitorStats,
}

impl MonitorRuntime {
    /// Perform the startup contract. Fails only on an invalid config or an
    /// uncreatable source directory.
    pub fn start(config: WatchConfig) -> Result<Self, MonitorError> {
        let monitor = SyncMonitor::start(config)?;
        Ok(Self {
            monitor,
            state: MonitorState::IdlePoll,
            stats: MonitorStats::default(),
        })
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    pub fn stats(&self) -> &MonitorStats {
        &self.stats
    }

    /// Run one poll cycle. Errors are logged, never returned.
    pub fn step(&mut self) -> Duration {
        self.stats.cycles += 1;
        match self.monitor.poll_once() {
            Ok(outcome) => {
                if self.state == MonitorState::ErrorBackoff {
                    tracing::info!("poll cycle recovered, resuming normal polling");
                }
                if outcome.is_synced() {
                    self.stats.syncs += 1;
                }
                self.state = MonitorState::IdlePoll;
                self.monitor.config().poll_interval
            }
            Err(err) => {
                let backoff = self.monitor.config().error_backoff;
                self.stats.errors += 1;
                self.state = MonitorState::ErrorBackoff;
                tracing::error!(
                    error = %err,
                    backoff_ms = u64::try_from(backoff.as_millis()).unwrap_or(u64::MAX),
                    "poll cycle failed; backing off",
                );
                backoff
            }
        }
    }

    /// Poll until `shutdown` resolves. A cycle in progress always completes;
    /// only the wait between cycles is cancelled.
    pub async fn run_until<F>(mut self, shutdown: F) -> MonitorStats
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        loop {
            let delay = self.step();
            tokio::select! {
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        tracing::info!(
            cycles = self.stats.cycles,
            syncs = self.stats.syncs,
            errors = self.stats.errors,
            "monitoring stopped",
        );
        self.stats
    }
}

/// Start the monitor and poll until Ctrl-C or a message on `shutdown_rx`.
pub async fn run(
    config: WatchConfig,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<MonitorStats, MonitorError> {
    let runtime = MonitorRuntime::start(config)?;

    let shutdown = async move {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                tracing::info!("shutdown requested, stopping monitor");
            }
            signal = tokio::signal::ctrl_c() => match signal {
                Ok(()) => tracing::info!("received ctrl-c, stopping monitor"),
                Err(err) => {
                    tracing::warn!(error = %err, "ctrl-c handler failed; waiting for shutdown request");
                    let _ = shutdown_rx.recv().await;
                }
            }
        }
    };

    Ok(runtime.run_until(shutdown).await)
}

/// Run the monitor on a single-threaded runtime and block until it stops.
pub fn start_blocking(config: WatchConfig, format: LogFormat) -> Result<MonitorStats, MonitorError> {
    init_tracing(format);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;

    let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);
    let stats = runtime.block_on(run(config, shutdown_rx));
    drop(shutdown_tx);
    stats
}

pub fn init_tracing(format: LogFormat) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt().with_env_filter(filter).with_target(false);
    let _ = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
