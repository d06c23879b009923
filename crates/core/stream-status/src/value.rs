//! Per-stream status value and run states

use chrono::{DateTime, Utc};
use protocol::{RateLimitedReason, StateId};

/// Lifecycle status of a stream within a run
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunState {
    /// No status has been reported for the stream yet.
    #[default]
    Pending,

    /// The stream is moving data.
    Running,

    /// The stream is running, but the source is being throttled.
    ///
    /// A sub-status of `Running`: the next record moves the stream back to `Running`.
    RateLimited,

    /// The stream stopped before all its data was synced.
    ///
    /// This is a terminal state.
    Incomplete,

    /// Every record of the stream was committed by the destination.
    ///
    /// This is a terminal state.
    Complete,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Running => "RUNNING",
            Self::RateLimited => "RATE_LIMITED",
            Self::Incomplete => "INCOMPLETE",
            Self::Complete => "COMPLETE",
        }
    }

    /// Returns true if no further transition is accepted out of this state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Incomplete | Self::Complete)
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rate-limit details reported by the source.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RateLimitedInfo {
    /// When the source expects its quota to reset
    pub quota_reset: Option<DateTime<Utc>>,
}

impl From<&RateLimitedReason> for RateLimitedInfo {
    fn from(reason: &RateLimitedReason) -> Self {
        Self {
            quota_reset: reason
                .quota_reset
                .and_then(DateTime::<Utc>::from_timestamp_millis),
        }
    }
}

/// Tracked status of a single stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamStatusValue {
    pub run_state: RunState,
    /// Set while the stream is rate limited
    pub metadata: Option<RateLimitedInfo>,
    /// Greatest checkpoint id observed for the stream
    pub latest_state_id: Option<StateId>,
    /// No record has been observed for the stream yet
    pub is_empty: bool,
    /// The source reported the stream as complete
    pub source_complete: bool,
}

impl Default for StreamStatusValue {
    fn default() -> Self {
        Self {
            run_state: RunState::Pending,
            metadata: None,
            latest_state_id: None,
            is_empty: true,
            source_complete: false,
        }
    }
}

impl StreamStatusValue {
    /// Whether a checkpoint with `state_id` acknowledges the end of the stream.
    ///
    /// The destination acknowledges completion by echoing the last checkpoint of a stream
    /// whose source side is complete.
    pub fn is_dest_complete(&self, state_id: StateId) -> bool {
        self.source_complete && self.latest_state_id == Some(state_id)
    }
}
