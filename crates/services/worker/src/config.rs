use std::time::Duration;

/// Default interval between two watchdog checks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Default time a destination call may take before it counts as stalled
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2 * 60 * 60);

/// Default time `close` waits for the watchdog to stop
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Configuration specific to the worker service
///
/// Created from the configuration file by the `replication-config` crate.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub destination_timeout: DestinationTimeoutConfig,
}

/// Destination timeout supervision settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DestinationTimeoutConfig {
    /// How often the watchdog checks the destination call timers
    pub poll_interval: Duration,

    /// Time after which a pending destination call counts as stalled
    pub timeout: Duration,

    /// Upper bound on the time spent waiting for the watchdog to stop on close
    pub shutdown_grace: Duration,
}

impl Default for DestinationTimeoutConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
        }
    }
}
