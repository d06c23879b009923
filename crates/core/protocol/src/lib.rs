//! Protocol message model exchanged between connectors and the replication worker.
//!
//! Only the parts of the protocol that the replication bookkeeping consumes are modelled in
//! detail. Every other message kind deserializes into [`Message::Other`] so that callers can
//! skip it without failing.

mod message;
mod stream;

pub use self::{
    message::{
        Message, RateLimitedReason, RecordMessage, StateId, StateMessage, StateType,
        StreamState, StreamStatus, StreamStatusReason, StreamStatusReasonType,
        StreamStatusTraceMessage, TraceMessage, TraceType,
    },
    stream::StreamDescriptor,
};
