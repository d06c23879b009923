//! Traits for the systems that own jobs: the persistence layer, failure notifications, and
//! job-state tracking.

use uuid::Uuid;

use crate::{
    attempt::AttemptNumber,
    failure::AttemptFailureSummary,
    job::{Job, JobConfigType},
    job_id::JobId,
    job_status::JobStatus,
};

/// Error type for collaborator implementations
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// An error returned by the job persistence layer.
#[derive(Debug, thiserror::Error)]
#[error("job persistence error")]
pub struct PersistenceError(#[source] pub BoxError);

impl PersistenceError {
    pub fn new(err: impl Into<BoxError>) -> Self {
        Self(err.into())
    }
}

/// Durable job storage.
///
/// Mutations are idempotent: failing an already failed job or attempt is not an error.
#[async_trait::async_trait]
pub trait JobPersistence: Send + Sync {
    /// Lists jobs of `connection_id` whose config type is in `config_types` and whose status is
    /// in `statuses`.
    async fn list_jobs(
        &self,
        connection_id: Uuid,
        config_types: &[JobConfigType],
        statuses: &[JobStatus],
    ) -> Result<Vec<Job>, PersistenceError>;

    async fn get_job(&self, job_id: JobId) -> Result<Job, PersistenceError>;

    async fn fail_job(&self, job_id: JobId) -> Result<(), PersistenceError>;

    async fn fail_attempt(
        &self,
        job_id: JobId,
        attempt_number: AttemptNumber,
    ) -> Result<(), PersistenceError>;

    async fn write_attempt_failure_summary(
        &self,
        job_id: JobId,
        attempt_number: AttemptNumber,
        summary: &AttemptFailureSummary,
    ) -> Result<(), PersistenceError>;
}

/// Delivers job failure notifications to users.
///
/// Fire-and-forget: delivery failures are handled by the implementation.
#[async_trait::async_trait]
pub trait JobNotifier: Send + Sync {
    async fn fail_job(&self, reason: &str, job: &Job);
}

/// Job states reported to the job tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackedJobState {
    Started,
    Succeeded,
    Failed,
}

/// Records job state transitions for analytics.
///
/// Fire-and-forget, like [`JobNotifier`].
#[async_trait::async_trait]
pub trait JobTracker: Send + Sync {
    async fn track_sync(&self, job: &Job, state: TrackedJobState);
}
