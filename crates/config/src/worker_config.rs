use crate::ConfigDuration;

/// `[destination_timeout]` section of the configuration file
///
/// All durations are floating-point seconds.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct DestinationTimeoutConfig {
    /// Interval between two checks of the destination call timers (default: 60)
    #[serde(default)]
    pub poll_interval_secs: ConfigDuration<60>,
    /// Time a destination call may take before it counts as stalled (default: 7200)
    #[serde(default)]
    pub timeout_secs: ConfigDuration<7200>,
    /// Time the supervisor waits for its watchdog to stop on close (default: 10)
    #[serde(default)]
    pub shutdown_grace_secs: ConfigDuration<10>,
}

impl From<&DestinationTimeoutConfig> for worker::config::DestinationTimeoutConfig {
    fn from(config: &DestinationTimeoutConfig) -> Self {
        Self {
            poll_interval: config.poll_interval_secs.into(),
            timeout: config.timeout_secs.into(),
            shutdown_grace: config.shutdown_grace_secs.into(),
        }
    }
}
