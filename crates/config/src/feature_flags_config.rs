use feature_flags::{ConfigFlagClient, Flag, FlagOverride};

/// `[feature_flags]` section of the configuration file
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct FeatureFlagsConfig {
    /// Default of `process-rate-limited-messages` (default: false)
    #[serde(default)]
    pub process_rate_limited_messages: Option<bool>,
    /// Default of `fail-sync-on-destination-timeout` (default: false)
    #[serde(default)]
    pub fail_sync_on_destination_timeout: Option<bool>,
    /// Per-workspace and per-connection values
    #[serde(default)]
    pub overrides: Vec<FlagOverride>,
}

impl From<FeatureFlagsConfig> for ConfigFlagClient {
    fn from(config: FeatureFlagsConfig) -> Self {
        let defaults = [
            (
                Flag::ProcessRateLimitedMessages,
                config.process_rate_limited_messages,
            ),
            (
                Flag::FailSyncOnDestinationTimeout,
                config.fail_sync_on_destination_timeout,
            ),
        ];

        let client = defaults
            .into_iter()
            .filter_map(|(flag, value)| value.map(|value| (flag, value)))
            .fold(ConfigFlagClient::new(), |client, (flag, value)| {
                client.with_default(flag, value)
            });

        config
            .overrides
            .into_iter()
            .fold(client, |client, flag_override| {
                if flag_override.workspace_id.is_none() && flag_override.connection_id.is_none() {
                    tracing::warn!(
                        flag = %flag_override.flag,
                        "ignoring feature flag override without a workspace or connection id"
                    );
                    return client;
                }
                client.with_override(flag_override)
            })
    }
}
