//! Fakes and message builders shared by the tracker tests.

use std::sync::Arc;

use async_trait::async_trait;
use feature_flags::{ConfigFlagClient, FeatureFlagClient, Flag, FlagContext, FlagEvaluationError};
use jobs::JobId;
use parking_lot::Mutex;
use protocol::{
    Message, RateLimitedReason, RecordMessage, StateId, StateMessage, StateType,
    StreamDescriptor, StreamState, StreamStatus, StreamStatusReason, StreamStatusReasonType,
    StreamStatusTraceMessage, TraceMessage, TraceType,
};
use uuid::Uuid;

use crate::{
    RunContext, StreamKey, StreamStatusEmitter, StreamStatusStore, StreamStatusTracker,
    StreamStatusUpdate,
};

/// Emitter that keeps every update in memory.
#[derive(Default)]
pub struct RecordingEmitter {
    updates: Mutex<Vec<StreamStatusUpdate>>,
}

impl RecordingEmitter {
    pub fn updates(&self) -> Vec<StreamStatusUpdate> {
        self.updates.lock().clone()
    }
}

#[async_trait]
impl StreamStatusEmitter for RecordingEmitter {
    async fn emit(&self, update: StreamStatusUpdate) {
        self.updates.lock().push(update);
    }
}

/// Flag client whose backend is always down.
pub struct UnavailableFlags;

#[async_trait]
impl FeatureFlagClient for UnavailableFlags {
    async fn bool_variation(
        &self,
        flag: Flag,
        _context: &FlagContext,
    ) -> Result<bool, FlagEvaluationError> {
        Err(FlagEvaluationError {
            flag,
            source: "flag service unavailable".into(),
        })
    }
}

pub fn run_context() -> RunContext {
    RunContext {
        workspace_id: Uuid::from_u128(0xaa),
        connection_id: Uuid::from_u128(0xbb),
        job_id: JobId::new(42),
        attempt_number: 1,
    }
}

pub fn rate_limited_messages(enabled: bool) -> Arc<dyn FeatureFlagClient> {
    Arc::new(ConfigFlagClient::new().with_default(Flag::ProcessRateLimitedMessages, enabled))
}

pub fn tracker(
    flags: Arc<dyn FeatureFlagClient>,
) -> StreamStatusTracker<Arc<RecordingEmitter>> {
    monitoring::logging::init();
    StreamStatusTracker::new(
        Arc::new(StreamStatusStore::new()),
        flags,
        Arc::new(RecordingEmitter::default()),
        run_context(),
    )
}

pub fn users() -> StreamDescriptor {
    StreamDescriptor::new("users", Some("public"))
}

pub fn key(stream: &StreamDescriptor) -> StreamKey {
    StreamKey::new(run_context().connection_id, stream)
}

pub fn stream_status(stream: &StreamDescriptor, status: StreamStatus) -> Message {
    trace(StreamStatusTraceMessage {
        stream_descriptor: stream.clone(),
        status,
        reasons: vec![],
    })
}

pub fn rate_limited(stream: &StreamDescriptor, quota_reset: i64) -> Message {
    trace(StreamStatusTraceMessage {
        stream_descriptor: stream.clone(),
        status: StreamStatus::Running,
        reasons: vec![StreamStatusReason {
            reason_type: StreamStatusReasonType::RateLimited,
            rate_limited: Some(RateLimitedReason {
                quota_reset: Some(quota_reset),
            }),
        }],
    })
}

pub fn record(stream: &StreamDescriptor) -> Message {
    Message::Record {
        record: RecordMessage {
            stream: stream.name.clone(),
            namespace: stream.namespace.clone(),
            data: serde_json::json!({"id": 1}),
            emitted_at: 0,
        },
    }
}

pub fn state(stream: &StreamDescriptor, id: u64) -> Message {
    Message::State {
        state: StateMessage {
            state_type: Some(StateType::Stream),
            stream: Some(StreamState {
                stream_descriptor: stream.clone(),
                stream_state: None,
            }),
            id: Some(StateId::new(id)),
        },
    }
}

fn trace(stream_status: StreamStatusTraceMessage) -> Message {
    Message::Trace {
        trace: TraceMessage {
            trace_type: TraceType::StreamStatus,
            emitted_at: 0.0,
            stream_status: Some(stream_status),
        },
    }
}
