use serde::{Deserialize, Serialize};

use crate::stream::StreamDescriptor;

/// A protocol message, tagged by its `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message {
    Record { record: RecordMessage },
    State { state: StateMessage },
    Trace { trace: TraceMessage },
    /// Any message kind the bookkeeping does not consume (logs, specs, catalogs, controls...)
    #[serde(other)]
    Other,
}

impl Message {
    /// Name of the message kind, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Record { .. } => "RECORD",
            Self::State { .. } => "STATE",
            Self::Trace { .. } => "TRACE",
            Self::Other => "OTHER",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMessage {
    pub stream: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default)]
    pub data: serde_json::Value,
    pub emitted_at: i64,
}

impl RecordMessage {
    pub fn stream_descriptor(&self) -> StreamDescriptor {
        StreamDescriptor {
            name: self.stream.clone(),
            namespace: self.namespace.clone(),
        }
    }
}

/// Checkpoint identifier the platform attaches to every state message it forwards.
///
/// The destination echoes a checkpoint back once everything before it has been committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateId(u64);

impl StateId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for StateId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for StateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StateType {
    Stream,
    Global,
    Legacy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateMessage {
    /// Scope of the checkpoint. Legacy connectors omit it.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub state_type: Option<StateType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<StreamState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<StateId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamState {
    pub stream_descriptor: StreamDescriptor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_state: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TraceType {
    Error,
    Estimate,
    StreamStatus,
    Analytics,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceMessage {
    #[serde(rename = "type")]
    pub trace_type: TraceType,
    pub emitted_at: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_status: Option<StreamStatusTraceMessage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StreamStatus {
    Started,
    Running,
    Complete,
    Incomplete,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamStatusTraceMessage {
    pub stream_descriptor: StreamDescriptor,
    pub status: StreamStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<StreamStatusReason>,
}

impl StreamStatusTraceMessage {
    /// Returns the rate-limit details of the first `RATE_LIMITED` reason, if any.
    pub fn rate_limited(&self) -> Option<&RateLimitedReason> {
        self.reasons.iter().find_map(|reason| match reason.reason_type {
            StreamStatusReasonType::RateLimited => reason.rate_limited.as_ref(),
            StreamStatusReasonType::Other => None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StreamStatusReasonType {
    RateLimited,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamStatusReason {
    #[serde(rename = "type")]
    pub reason_type: StreamStatusReasonType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limited: Option<RateLimitedReason>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitedReason {
    /// When the source expects its quota to reset, in epoch milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quota_reset: Option<i64>,
}
