//! Job and attempt model shared by the replication services, plus the collaborator traits
//! through which the services read and mutate jobs.

mod attempt;
mod collaborators;
mod failure;
mod job;
mod job_id;
mod job_status;

pub use self::{
    attempt::{Attempt, AttemptNumber, AttemptStatus},
    collaborators::{
        BoxError, JobNotifier, JobPersistence, JobTracker, PersistenceError, TrackedJobState,
    },
    failure::{AttemptFailureSummary, FailureOrigin, FailureReason, FailureType},
    job::{Job, JobConfigType},
    job_id::JobId,
    job_status::JobStatus,
};
