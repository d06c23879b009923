//! Keyed table of stream statuses for a single run.

use std::collections::HashMap;

use parking_lot::RwLock;
use protocol::StateId;

use crate::{
    key::StreamKey,
    value::{RateLimitedInfo, RunState, StreamStatusValue},
};

/// Outcome of a store mutation: the run state before and the value after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub key: StreamKey,
    pub previous: RunState,
    pub current: StreamStatusValue,
}

impl StatusChange {
    /// Whether the mutation moved the stream to a different run state.
    pub fn is_transition(&self) -> bool {
        self.previous != self.current.run_state
    }
}

/// Stream statuses of a run, keyed by stream.
///
/// Values are created lazily, in the `Pending` state, by the first mutation of a key. Each
/// mutation is atomic. Once a stream reaches a terminal run state, mutations of its key are
/// ignored.
#[derive(Debug, Default)]
pub struct StreamStatusStore {
    statuses: RwLock<HashMap<StreamKey, StreamStatusValue>>,
}

impl StreamStatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &StreamKey) -> Option<StreamStatusValue> {
        self.statuses.read().get(key).cloned()
    }

    /// Copy of every tracked status, ordered by key.
    pub fn snapshot(&self) -> Vec<(StreamKey, StreamStatusValue)> {
        let mut statuses: Vec<_> = self
            .statuses
            .read()
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        statuses.sort_by(|(a, _), (b, _)| a.cmp(b));
        statuses
    }

    pub fn len(&self) -> usize {
        self.statuses.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.read().is_empty()
    }

    /// Moves the stream to `Running`, dropping any rate-limit details.
    pub fn set_running(&self, key: &StreamKey) -> StatusChange {
        self.mutate(key, |value| {
            value.run_state = RunState::Running;
            value.metadata = None;
        })
    }

    /// Moves the stream to `RateLimited`.
    ///
    /// The caller observed the stream running, so a `Pending` stream goes through `Running`
    /// within the same mutation.
    pub fn set_rate_limited(&self, key: &StreamKey, info: RateLimitedInfo) -> StatusChange {
        self.mutate(key, |value| {
            value.run_state = RunState::RateLimited;
            value.metadata = Some(info);
        })
    }

    pub fn set_incomplete(&self, key: &StreamKey) -> StatusChange {
        self.mutate(key, |value| value.run_state = RunState::Incomplete)
    }

    /// Marks the source side of the stream as complete. The run state is unchanged.
    pub fn set_source_complete(&self, key: &StreamKey) -> StatusChange {
        self.mutate(key, |value| value.source_complete = true)
    }

    /// Records that a data record was observed for the stream.
    pub fn record_observed(&self, key: &StreamKey) -> StatusChange {
        self.mutate(key, |value| {
            if value.run_state == RunState::RateLimited {
                value.metadata = None;
            }
            value.run_state = RunState::Running;
            value.is_empty = false;
        })
    }

    /// Records a checkpoint for the stream.
    ///
    /// A checkpoint acknowledging completion (see [`StreamStatusValue::is_dest_complete`])
    /// completes the stream. Any other checkpoint advances the latest state id; ids never move
    /// backwards.
    pub fn observe_state_id(&self, key: &StreamKey, state_id: StateId) -> StatusChange {
        self.mutate(key, |value| {
            if value.is_dest_complete(state_id) {
                value.run_state = RunState::Complete;
            } else {
                value.latest_state_id = value.latest_state_id.max(Some(state_id));
            }
        })
    }

    fn mutate(&self, key: &StreamKey, f: impl FnOnce(&mut StreamStatusValue)) -> StatusChange {
        let mut statuses = self.statuses.write();
        let value = statuses.entry(key.clone()).or_default();
        let previous = value.run_state;

        if previous.is_terminal() {
            tracing::debug!(
                stream = %key,
                run_state = %previous,
                "stream already terminal, ignoring update"
            );
        } else {
            f(value);
        }

        StatusChange {
            key: key.clone(),
            previous,
            current: value.clone(),
        }
    }
}
