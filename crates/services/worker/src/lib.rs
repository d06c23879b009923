//! Replication worker services.
//!
//! The worker drives the source and destination connectors of a sync. This crate holds the
//! pieces of that loop that need supervision: the [`DestinationTimeoutSupervisor`] detects a
//! destination connector that stopped responding.

pub mod config;
pub mod metrics;
pub mod timeout;

pub use self::{
    config::Config,
    timeout::{DestinationCall, DestinationTimeoutError, DestinationTimeoutSupervisor},
};
