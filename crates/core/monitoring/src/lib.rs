//! Logging and metrics primitives shared by the replication crates.

pub mod config;
pub mod logging;
pub mod telemetry;
