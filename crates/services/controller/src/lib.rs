//! Control-plane job bookkeeping for replications.
//!
//! The [`JobStatusReconciler`] answers questions about a connection's job history and closes
//! out the jobs a crashed or restarted orchestrator left behind.

pub mod reconciler;

pub use self::reconciler::{FailNonTerminalJobsError, JobStatusReconciler};
