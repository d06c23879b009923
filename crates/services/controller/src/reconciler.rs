//! Job status reconciliation
//!
//! The reconciler depends on the collaborator traits of the `jobs` crate only:
//! - [`JobPersistence`] is the source of truth for jobs and attempts
//! - [`JobNotifier`] and [`JobTracker`] are fire-and-forget side effects, performed once the
//!   persistence mutations of a job succeeded
//!
//! Persistence errors are never retried here; they are returned to the caller, which owns the
//! retry policy.

use std::sync::Arc;

use chrono::Utc;
use jobs::{
    AttemptFailureSummary, AttemptNumber, Job, JobConfigType, JobId, JobNotifier,
    JobPersistence, JobStatus, JobTracker, PersistenceError, TrackedJobState,
};
use uuid::Uuid;

/// Reason given to users for jobs failed by [`JobStatusReconciler::fail_non_terminal_jobs`]
pub const CLEAN_JOB_STATE_REASON: &str = "Failing job in order to start from a clean job state";

/// Returns the job created immediately before `target_job_id`.
///
/// Jobs are ordered by creation time only; ids carry no ordering. Returns `None` if the target
/// is not in `jobs` or no job was created strictly before it.
pub fn find_previous_job(jobs: &[Job], target_job_id: JobId) -> Option<&Job> {
    let target = jobs.iter().find(|job| job.id == target_job_id)?;
    jobs.iter()
        .filter(|job| job.created_at < target.created_at)
        .max_by_key(|job| job.created_at)
}

pub fn did_job_succeed(job: &Job) -> bool {
    job.status == JobStatus::Succeeded
}

/// Reconciles job and attempt statuses of connections.
pub struct JobStatusReconciler {
    persistence: Arc<dyn JobPersistence>,
    notifier: Arc<dyn JobNotifier>,
    tracker: Arc<dyn JobTracker>,
}

impl JobStatusReconciler {
    pub fn new(
        persistence: Arc<dyn JobPersistence>,
        notifier: Arc<dyn JobNotifier>,
        tracker: Arc<dyn JobTracker>,
    ) -> Self {
        Self {
            persistence,
            notifier,
            tracker,
        }
    }

    /// Fails every replication job of `connection_id` that is not in a terminal status.
    ///
    /// For each such job: the job is failed, each of its running attempts is failed with a
    /// "workflow restarted" failure summary, and the failure is notified and tracked. Jobs
    /// without attempts are failed, notified and tracked as well.
    ///
    /// Already terminal jobs are not listed, so calling this again is a no-op.
    #[tracing::instrument(skip(self), err)]
    pub async fn fail_non_terminal_jobs(
        &self,
        connection_id: Uuid,
    ) -> Result<(), FailNonTerminalJobsError> {
        let jobs = self
            .persistence
            .list_jobs(
                connection_id,
                &JobConfigType::replication_types(),
                &JobStatus::non_terminal_statuses(),
            )
            .await
            .map_err(|source| FailNonTerminalJobsError::ListJobs {
                connection_id,
                source,
            })?;

        if jobs.is_empty() {
            return Ok(());
        }

        tracing::info!(
            %connection_id,
            job_count = jobs.len(),
            "failing non-terminal jobs"
        );

        for job in jobs {
            self.fail_job(&job).await?;
        }

        Ok(())
    }

    async fn fail_job(&self, job: &Job) -> Result<(), FailNonTerminalJobsError> {
        let job_id = job.id;

        self.persistence
            .fail_job(job_id)
            .await
            .map_err(|source| FailNonTerminalJobsError::FailJob { job_id, source })?;

        for attempt in job.running_attempts() {
            self.fail_attempt(job_id, attempt.number).await?;
        }

        let failed_job = self
            .persistence
            .get_job(job_id)
            .await
            .map_err(|source| FailNonTerminalJobsError::GetJob { job_id, source })?;

        self.notifier
            .fail_job(CLEAN_JOB_STATE_REASON, &failed_job)
            .await;
        self.tracker
            .track_sync(&failed_job, TrackedJobState::Failed)
            .await;

        tracing::info!(%job_id, status = %failed_job.status, "failed non-terminal job");
        Ok(())
    }

    async fn fail_attempt(
        &self,
        job_id: JobId,
        attempt_number: AttemptNumber,
    ) -> Result<(), FailNonTerminalJobsError> {
        self.persistence
            .fail_attempt(job_id, attempt_number)
            .await
            .map_err(|source| FailNonTerminalJobsError::FailAttempt {
                job_id,
                attempt_number,
                source,
            })?;

        let summary = AttemptFailureSummary::workflow_restarted(job_id, attempt_number, Utc::now());
        self.persistence
            .write_attempt_failure_summary(job_id, attempt_number, &summary)
            .await
            .map_err(|source| FailNonTerminalJobsError::WriteFailureSummary {
                job_id,
                attempt_number,
                source,
            })
    }
}

/// Errors that can occur when failing the non-terminal jobs of a connection
///
/// Each variant names the persistence operation that failed. Jobs processed before the failure
/// stay failed.
#[derive(Debug, thiserror::Error)]
pub enum FailNonTerminalJobsError {
    /// Failed to list the non-terminal jobs of the connection
    #[error("failed to list non-terminal jobs of connection {connection_id}")]
    ListJobs {
        connection_id: Uuid,
        #[source]
        source: PersistenceError,
    },

    /// Failed to mark the job as failed
    #[error("failed to fail job {job_id}")]
    FailJob {
        job_id: JobId,
        #[source]
        source: PersistenceError,
    },

    /// Failed to mark a running attempt of the job as failed
    #[error("failed to fail attempt {attempt_number} of job {job_id}")]
    FailAttempt {
        job_id: JobId,
        attempt_number: AttemptNumber,
        #[source]
        source: PersistenceError,
    },

    /// Failed to write the failure summary of a failed attempt
    #[error("failed to write failure summary of attempt {attempt_number} of job {job_id}")]
    WriteFailureSummary {
        job_id: JobId,
        attempt_number: AttemptNumber,
        #[source]
        source: PersistenceError,
    },

    /// Failed to fetch the job after failing it
    #[error("failed to fetch job {job_id}")]
    GetJob {
        job_id: JobId,
        #[source]
        source: PersistenceError,
    },
}
