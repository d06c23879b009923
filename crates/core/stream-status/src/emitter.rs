//! Status-change emitter trait and implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use crate::{
    context::RunContext,
    key::StreamKey,
    value::{RateLimitedInfo, RunState},
};

/// A stream moved to a new run state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamStatusUpdate {
    pub key: StreamKey,
    pub run_state: RunState,
    pub metadata: Option<RateLimitedInfo>,
    pub context: RunContext,
    pub transitioned_at: DateTime<Utc>,
}

/// Trait for emitting stream status changes.
///
/// Implementations must be `Send + Sync` for use across async tasks. Emission is
/// fire-and-forget: implementations handle their own delivery failures.
#[async_trait]
pub trait StreamStatusEmitter: Send + Sync {
    async fn emit(&self, update: StreamStatusUpdate);
}

/// No-op implementation for when status reporting is disabled.
pub struct NoOpEmitter;

#[async_trait]
impl StreamStatusEmitter for NoOpEmitter {
    async fn emit(&self, _update: StreamStatusUpdate) {
        // No-op: reporting disabled
    }
}

/// Hands updates over to a separate reconciliation task through a channel.
///
/// See [`ReconcilingEmitter::consume`](crate::ReconcilingEmitter::consume) for the receiving
/// side.
#[derive(Debug, Clone)]
pub struct ChannelEmitter {
    tx: mpsc::UnboundedSender<StreamStatusUpdate>,
}

impl ChannelEmitter {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<StreamStatusUpdate>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl StreamStatusEmitter for ChannelEmitter {
    async fn emit(&self, update: StreamStatusUpdate) {
        if let Err(mpsc::error::SendError(update)) = self.tx.send(update) {
            tracing::debug!(
                stream = %update.key,
                run_state = %update.run_state,
                "status receiver dropped, discarding update"
            );
        }
    }
}

#[async_trait]
impl<E> StreamStatusEmitter for std::sync::Arc<E>
where
    E: StreamStatusEmitter + ?Sized,
{
    async fn emit(&self, update: StreamStatusUpdate) {
        (**self).emit(update).await
    }
}
