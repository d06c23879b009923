//! Supervision of blocking destination connector calls.
//!
//! The worker starts a timer before every `accept` and `notify end of input` call to the
//! destination, and resets it once the call returns. While the replication runs under
//! [`DestinationTimeoutSupervisor::run_with_supervision`], a watchdog checks the timers every
//! poll interval. A timer running for longer than the timeout means the destination stalled.

use std::{
    future::Future,
    sync::{Arc, OnceLock},
    time::Duration,
};

use feature_flags::{FeatureFlagClient, Flag, FlagContext};
use futures::future::{self, Either};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::{sync::CancellationToken, task::TaskTracker};

use self::timer::Timers;
use crate::{config::DestinationTimeoutConfig, metrics::MetricsRegistry};

mod timer;

/// Destination calls monitored by the supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DestinationCall {
    Accept,
    NotifyEndOfInput,
}

impl std::fmt::Display for DestinationCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Accept => f.write_str("accept"),
            Self::NotifyEndOfInput => f.write_str("notify end of input"),
        }
    }
}

/// The destination stopped responding and the supervised task was cancelled.
///
/// Only returned when the `fail-sync-on-destination-timeout` flag is enabled for the
/// connection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("destination timed out: {call} call did not return within {timeout:?}")]
pub struct DestinationTimeoutError {
    pub call: DestinationCall,
    pub timeout: Duration,
}

/// Watches the destination calls of one sync.
pub struct DestinationTimeoutSupervisor {
    timers: Arc<Timers>,
    flags: Arc<dyn FeatureFlagClient>,
    context: FlagContext,
    metrics: Option<Arc<MetricsRegistry>>,
    config: DestinationTimeoutConfig,
    watchdogs: OnceLock<Watchdogs>,
}

/// Executor of the watchdog tasks, created on first use.
struct Watchdogs {
    tracker: TaskTracker,
    shutdown: CancellationToken,
}

impl DestinationTimeoutSupervisor {
    pub fn new(
        flags: Arc<dyn FeatureFlagClient>,
        context: FlagContext,
        metrics: Option<Arc<MetricsRegistry>>,
        config: DestinationTimeoutConfig,
    ) -> Self {
        Self {
            timers: Arc::new(Timers::new()),
            flags,
            context,
            metrics,
            config,
            watchdogs: OnceLock::new(),
        }
    }

    /// Starts the accept timer. A running timer starts over.
    pub fn start_accept(&self) {
        self.timers.start(DestinationCall::Accept);
    }

    pub fn reset_accept(&self) {
        self.timers.reset(DestinationCall::Accept);
    }

    /// Starts the notify-end-of-input timer. A running timer starts over.
    pub fn start_notify_end_of_input(&self) {
        self.timers.start(DestinationCall::NotifyEndOfInput);
    }

    pub fn reset_notify_end_of_input(&self) {
        self.timers.reset(DestinationCall::NotifyEndOfInput);
    }

    /// Runs `task` until it completes, while watching the destination call timers.
    ///
    /// If a destination call exceeds the timeout before `task` completes, the
    /// `fail-sync-on-destination-timeout` flag decides the outcome: when enabled, `task` is
    /// dropped and a [`DestinationTimeoutError`] is returned; otherwise the timeout is only
    /// reported and `task` runs to completion unsupervised.
    ///
    /// Closing the supervisor while the task runs stops the supervision, not the task. Dropping
    /// the returned future stops the watchdog of this run.
    pub async fn run_with_supervision<F>(
        &self,
        task: F,
    ) -> Result<F::Output, DestinationTimeoutError>
    where
        F: Future,
    {
        let watchdogs = self.watchdogs();
        let cancel = watchdogs.shutdown.child_token();
        // Stops the watchdog on every exit, including the caller dropping this future
        let _cancel_on_exit = cancel.clone().drop_guard();
        let watchdog = watchdogs.tracker.spawn(watch(
            self.timers.clone(),
            self.config,
            self.metrics.clone(),
            self.context.connection_id,
            cancel,
        ));

        let task = std::pin::pin!(task);
        let (watchdog_result, task) = match future::select(task, watchdog).await {
            Either::Left((output, _watchdog)) => return Ok(output),
            Either::Right(finished) => finished,
        };

        match watchdog_result {
            Ok(Some(call)) => {
                if self.fail_on_timeout().await {
                    tracing::error!(
                        %call,
                        timeout = ?self.config.timeout,
                        connection_id = %self.context.connection_id,
                        "destination timed out, cancelling the sync"
                    );
                    return Err(DestinationTimeoutError {
                        call,
                        timeout: self.config.timeout,
                    });
                }
                tracing::info!(
                    %call,
                    workspace_id = %self.context.workspace_id,
                    connection_id = %self.context.connection_id,
                    "destination timed out, but failing the sync is disabled for this connection"
                );
            }
            Ok(None) => {
                tracing::info!("destination timeout supervision interrupted");
            }
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    error_source = monitoring::logging::error_source(&err),
                    "destination timeout watchdog failed"
                );
            }
        }

        Ok(task.await)
    }

    /// Stops the watchdog, waiting for it up to the configured shutdown grace period.
    pub async fn close(&self) {
        let Some(watchdogs) = self.watchdogs.get() else {
            return;
        };

        watchdogs.shutdown.cancel();
        watchdogs.tracker.close();

        let grace = self.config.shutdown_grace;
        if tokio::time::timeout(grace, watchdogs.tracker.wait())
            .await
            .is_err()
        {
            tracing::warn!(?grace, "destination timeout watchdog did not stop in time");
        }
    }

    async fn fail_on_timeout(&self) -> bool {
        feature_flags::bool_variation_or_default(
            self.flags.as_ref(),
            Flag::FailSyncOnDestinationTimeout,
            &self.context,
        )
        .await
    }

    fn watchdogs(&self) -> &Watchdogs {
        self.watchdogs.get_or_init(|| Watchdogs {
            tracker: TaskTracker::new(),
            shutdown: CancellationToken::new(),
        })
    }
}

impl Drop for DestinationTimeoutSupervisor {
    fn drop(&mut self) {
        if let Some(watchdogs) = self.watchdogs.get() {
            watchdogs.shutdown.cancel();
        }
    }
}

/// Polls the timers until one exceeds the timeout or `cancel` fires.
///
/// Returns the call that timed out, or `None` when cancelled.
async fn watch(
    timers: Arc<Timers>,
    config: DestinationTimeoutConfig,
    metrics: Option<Arc<MetricsRegistry>>,
    connection_id: uuid::Uuid,
    cancel: CancellationToken,
) -> Option<DestinationCall> {
    // `interval_at` rejects a zero period
    let poll_interval = config.poll_interval.max(Duration::from_millis(1));
    let mut interval = tokio::time::interval_at(Instant::now() + poll_interval, poll_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!("stopping destination timeout watchdog");
                return None;
            }
            _ = interval.tick() => {
                let Some(call) = timers.timed_out(config.timeout) else {
                    continue;
                };

                tracing::error!(%call, %connection_id, "destination call timed out");
                if let Some(metrics) = &metrics {
                    metrics.inc_destination_timeout(call, connection_id);
                }
                return Some(call);
            }
        }
    }
}
