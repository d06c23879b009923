use std::collections::HashMap;

use uuid::Uuid;

use crate::{FeatureFlagClient, Flag, FlagContext, FlagEvaluationError};

/// A per-workspace or per-connection flag value.
///
/// An override that names both a workspace and a connection only applies when both match.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct FlagOverride {
    pub flag: Flag,
    #[serde(default)]
    pub workspace_id: Option<Uuid>,
    #[serde(default)]
    pub connection_id: Option<Uuid>,
    pub value: bool,
}

impl FlagOverride {
    fn matches(&self, flag: Flag, context: &FlagContext) -> bool {
        self.flag == flag
            && self
                .workspace_id
                .is_none_or(|id| id == context.workspace_id)
            && self
                .connection_id
                .is_none_or(|id| id == context.connection_id)
    }
}

/// Flag client backed by static configuration.
///
/// Resolution order: a connection override, then a workspace override, then the configured
/// default, then [`Flag::default_value`].
#[derive(Debug, Clone, Default)]
pub struct ConfigFlagClient {
    defaults: HashMap<Flag, bool>,
    overrides: Vec<FlagOverride>,
}

impl ConfigFlagClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default(mut self, flag: Flag, value: bool) -> Self {
        self.defaults.insert(flag, value);
        self
    }

    pub fn with_override(mut self, flag_override: FlagOverride) -> Self {
        self.overrides.push(flag_override);
        self
    }

    /// Resolves the value of `flag` for `context`.
    pub fn resolve(&self, flag: Flag, context: &FlagContext) -> bool {
        let matching = || {
            self.overrides
                .iter()
                .filter(move |o| o.matches(flag, context))
        };

        matching()
            .find(|o| o.connection_id.is_some())
            .or_else(|| matching().find(|o| o.workspace_id.is_some()))
            .map(|o| o.value)
            .or_else(|| self.defaults.get(&flag).copied())
            .unwrap_or_else(|| flag.default_value())
    }
}

#[async_trait::async_trait]
impl FeatureFlagClient for ConfigFlagClient {
    async fn bool_variation(
        &self,
        flag: Flag,
        context: &FlagContext,
    ) -> Result<bool, FlagEvaluationError> {
        Ok(self.resolve(flag, context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_without_configuration_uses_flag_default() {
        //* Given
        let client = ConfigFlagClient::new();
        let context = FlagContext::new(Uuid::new_v4(), Uuid::new_v4());

        //* When
        let value = client.resolve(Flag::FailSyncOnDestinationTimeout, &context);

        //* Then
        assert!(!value);
    }

    #[test]
    fn resolve_prefers_connection_over_workspace_over_default() {
        //* Given
        let workspace_id = Uuid::new_v4();
        let connection_id = Uuid::new_v4();
        let client = ConfigFlagClient::new()
            .with_default(Flag::ProcessRateLimitedMessages, true)
            .with_override(FlagOverride {
                flag: Flag::ProcessRateLimitedMessages,
                workspace_id: Some(workspace_id),
                connection_id: None,
                value: false,
            })
            .with_override(FlagOverride {
                flag: Flag::ProcessRateLimitedMessages,
                workspace_id: None,
                connection_id: Some(connection_id),
                value: true,
            });

        //* When
        let overridden_connection = client.resolve(
            Flag::ProcessRateLimitedMessages,
            &FlagContext::new(workspace_id, connection_id),
        );
        let other_connection = client.resolve(
            Flag::ProcessRateLimitedMessages,
            &FlagContext::new(workspace_id, Uuid::new_v4()),
        );
        let other_workspace = client.resolve(
            Flag::ProcessRateLimitedMessages,
            &FlagContext::new(Uuid::new_v4(), Uuid::new_v4()),
        );

        //* Then
        assert!(overridden_connection, "connection override wins");
        assert!(!other_connection, "workspace override applies");
        assert!(other_workspace, "configured default applies");
    }

    #[test]
    fn override_for_another_flag_is_ignored() {
        //* Given
        let connection_id = Uuid::new_v4();
        let client = ConfigFlagClient::new().with_override(FlagOverride {
            flag: Flag::ProcessRateLimitedMessages,
            workspace_id: None,
            connection_id: Some(connection_id),
            value: true,
        });

        //* When
        let value = client.resolve(
            Flag::FailSyncOnDestinationTimeout,
            &FlagContext::new(Uuid::new_v4(), connection_id),
        );

        //* Then
        assert!(!value);
    }
}
