//! Interpretation of protocol messages into stream statuses.

use std::sync::Arc;

use chrono::Utc;
use feature_flags::{FeatureFlagClient, Flag};
use protocol::{Message, StateType, StreamStatus, StreamStatusTraceMessage, TraceType};

use crate::{
    context::RunContext,
    emitter::{StreamStatusEmitter, StreamStatusUpdate},
    key::StreamKey,
    store::{StatusChange, StreamStatusStore},
    value::RateLimitedInfo,
};

/// Tracks the status of every stream of a run.
///
/// Messages are fed one at a time, in the order they flow through the replication. Each
/// message that moves a stream to a different run state produces exactly one
/// [`StreamStatusUpdate`].
pub struct StreamStatusTracker<E> {
    store: Arc<StreamStatusStore>,
    flags: Arc<dyn FeatureFlagClient>,
    emitter: E,
    context: RunContext,
}

impl<E> StreamStatusTracker<E>
where
    E: StreamStatusEmitter,
{
    pub fn new(
        store: Arc<StreamStatusStore>,
        flags: Arc<dyn FeatureFlagClient>,
        emitter: E,
        context: RunContext,
    ) -> Self {
        Self {
            store,
            flags,
            emitter,
            context,
        }
    }

    /// The store backing this tracker, for concurrent readers.
    pub fn store(&self) -> &Arc<StreamStatusStore> {
        &self.store
    }

    pub fn context(&self) -> &RunContext {
        &self.context
    }

    pub fn emitter(&self) -> &E {
        &self.emitter
    }

    /// Applies `message` to the status of the stream it belongs to.
    ///
    /// Messages that carry no stream status information are dropped.
    pub async fn track(&self, message: &Message) {
        let change = match message {
            Message::Trace { trace } if trace.trace_type == TraceType::StreamStatus => {
                match &trace.stream_status {
                    Some(status) => self.handle_stream_status(status).await,
                    None => {
                        tracing::debug!("stream status trace without payload, ignoring");
                        return;
                    }
                }
            }
            Message::Record { record } => {
                let key = self.key(&record.stream_descriptor());
                self.store.record_observed(&key)
            }
            Message::State { state } if state.state_type == Some(StateType::Stream) => {
                let (Some(stream), Some(state_id)) = (&state.stream, state.id) else {
                    tracing::debug!("stream state without descriptor or checkpoint id, ignoring");
                    return;
                };
                let key = self.key(&stream.stream_descriptor);
                self.store.observe_state_id(&key, state_id)
            }
            other => {
                tracing::debug!(kind = other.kind(), "message carries no stream status, ignoring");
                return;
            }
        };

        self.notify(change).await;
    }

    async fn handle_stream_status(&self, status: &StreamStatusTraceMessage) -> StatusChange {
        let key = self.key(&status.stream_descriptor);
        match status.status {
            StreamStatus::Started => self.store.set_running(&key),
            StreamStatus::Running => match status.rate_limited() {
                Some(reason) if self.process_rate_limited_messages().await => {
                    self.store.set_rate_limited(&key, RateLimitedInfo::from(reason))
                }
                _ => self.store.set_running(&key),
            },
            StreamStatus::Incomplete => self.store.set_incomplete(&key),
            StreamStatus::Complete => self.store.set_source_complete(&key),
        }
    }

    async fn process_rate_limited_messages(&self) -> bool {
        feature_flags::bool_variation_or_default(
            self.flags.as_ref(),
            Flag::ProcessRateLimitedMessages,
            &self.context.flag_context(),
        )
        .await
    }

    async fn notify(&self, change: StatusChange) {
        if !change.is_transition() {
            return;
        }

        tracing::debug!(
            stream = %change.key,
            from = %change.previous,
            to = %change.current.run_state,
            "stream status changed"
        );

        self.emitter
            .emit(StreamStatusUpdate {
                key: change.key,
                run_state: change.current.run_state,
                metadata: change.current.metadata,
                context: self.context,
                transitioned_at: Utc::now(),
            })
            .await;
    }

    fn key(&self, stream: &protocol::StreamDescriptor) -> StreamKey {
        StreamKey::new(self.context.connection_id, stream)
    }
}
