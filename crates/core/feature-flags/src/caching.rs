use std::collections::HashMap;

use parking_lot::Mutex;

use crate::{FeatureFlagClient, Flag, FlagContext, FlagEvaluationError};

/// Memoizes flag values per `(flag, context)` pair.
///
/// Values are never shared between differing contexts. Failed evaluations are not cached, so
/// the next call retries the inner client.
#[derive(Debug)]
pub struct CachingFlagClient<C> {
    inner: C,
    cache: Mutex<HashMap<(Flag, FlagContext), bool>>,
}

impl<C> CachingFlagClient<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            cache: Default::default(),
        }
    }

    /// Drops every memoized value.
    pub fn clear(&self) {
        self.cache.lock().clear();
    }
}

#[async_trait::async_trait]
impl<C> FeatureFlagClient for CachingFlagClient<C>
where
    C: FeatureFlagClient,
{
    async fn bool_variation(
        &self,
        flag: Flag,
        context: &FlagContext,
    ) -> Result<bool, FlagEvaluationError> {
        let cached = self.cache.lock().get(&(flag, *context)).copied();
        if let Some(value) = cached {
            return Ok(value);
        }

        let value = self.inner.bool_variation(flag, context).await?;
        self.cache.lock().insert((flag, *context), value);
        Ok(value)
    }
}
