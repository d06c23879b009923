//! Feature-flag evaluation for the replication bookkeeping.
//!
//! Consumers depend on the [`FeatureFlagClient`] trait only. The crate ships a
//! configuration-driven client ([`ConfigFlagClient`]) and a memoizing wrapper
//! ([`CachingFlagClient`]) that can sit in front of any client.

use monitoring::logging;
use uuid::Uuid;

mod caching;
mod config_client;

pub use self::{
    caching::CachingFlagClient,
    config_client::{ConfigFlagClient, FlagOverride},
};

/// Error type for flag backends
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The flags consulted by the replication bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Flag {
    /// Whether `RUNNING` stream-status traces carrying rate-limit details move the stream to
    /// the rate-limited state.
    ProcessRateLimitedMessages,
    /// Whether a stalled destination fails the sync instead of only being reported.
    FailSyncOnDestinationTimeout,
}

impl Flag {
    /// The flag key, as known by the flag service.
    pub fn key(&self) -> &'static str {
        match self {
            Self::ProcessRateLimitedMessages => "process-rate-limited-messages",
            Self::FailSyncOnDestinationTimeout => "fail-sync-on-destination-timeout",
        }
    }

    /// The value used when the flag cannot be evaluated.
    pub fn default_value(&self) -> bool {
        match self {
            Self::ProcessRateLimitedMessages => false,
            Self::FailSyncOnDestinationTimeout => false,
        }
    }
}

impl std::fmt::Display for Flag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Evaluation context: the workspace and connection a sync runs for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlagContext {
    pub workspace_id: Uuid,
    pub connection_id: Uuid,
}

impl FlagContext {
    pub fn new(workspace_id: Uuid, connection_id: Uuid) -> Self {
        Self {
            workspace_id,
            connection_id,
        }
    }
}

/// Evaluates boolean feature flags for a given context.
#[async_trait::async_trait]
pub trait FeatureFlagClient: Send + Sync {
    async fn bool_variation(
        &self,
        flag: Flag,
        context: &FlagContext,
    ) -> Result<bool, FlagEvaluationError>;
}

/// Failed to evaluate a flag
///
/// The flag backend could not produce a value, e.g. because the flag service was unreachable.
#[derive(Debug, thiserror::Error)]
#[error("failed to evaluate flag '{flag}'")]
pub struct FlagEvaluationError {
    pub flag: Flag,
    #[source]
    pub source: BoxError,
}

/// Evaluates `flag`, falling back to [`Flag::default_value`] when the evaluation fails.
///
/// Failures are logged at warn level and never reach the caller.
pub async fn bool_variation_or_default(
    client: &dyn FeatureFlagClient,
    flag: Flag,
    context: &FlagContext,
) -> bool {
    match client.bool_variation(flag, context).await {
        Ok(value) => value,
        Err(err) => {
            let default = flag.default_value();
            tracing::warn!(
                %flag,
                workspace_id = %context.workspace_id,
                connection_id = %context.connection_id,
                default,
                error = %err,
                error_source = logging::error_source(&err),
                "flag evaluation failed, using default"
            );
            default
        }
    }
}
