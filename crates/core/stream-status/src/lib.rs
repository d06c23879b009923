//! Per-stream run status of a replication.
//!
//! The [`StreamStatusTracker`] interprets the protocol messages of a run and keeps the
//! [`StreamStatusStore`] up to date. Every run-state transition is handed to a
//! [`StreamStatusEmitter`], typically a [`ReconcilingEmitter`] that persists it through the
//! control plane's [`StreamStatusApi`].

mod context;
mod emitter;
mod key;
mod reconcile;
mod store;
mod tracker;
mod value;

pub use self::{
    context::RunContext,
    emitter::{ChannelEmitter, NoOpEmitter, StreamStatusEmitter, StreamStatusUpdate},
    key::StreamKey,
    reconcile::{
        BoxError, ReconcilingEmitter, ResponseCache, StreamStatusApi, StreamStatusApiError,
        StreamStatusRecord, StreamStatusRequest,
    },
    store::{StatusChange, StreamStatusStore},
    tracker::StreamStatusTracker,
    value::{RateLimitedInfo, RunState, StreamStatusValue},
};

/// In-tree integration tests
#[cfg(test)]
mod tests {
    mod it_tracker;
    mod utils;
}
