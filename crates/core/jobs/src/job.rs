use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    attempt::{Attempt, AttemptStatus},
    job_id::JobId,
    job_status::JobStatus,
};

/// A job of a connection, with its attempts.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Job {
    pub id: JobId,
    pub connection_id: Uuid,
    pub config_type: JobConfigType,
    pub created_at: DateTime<Utc>,
    pub status: JobStatus,
    #[serde(default)]
    pub attempts: Vec<Attempt>,
}

impl Job {
    /// Attempts of this job that are still running.
    pub fn running_attempts(&self) -> impl Iterator<Item = &Attempt> {
        self.attempts
            .iter()
            .filter(|attempt| attempt.status == AttemptStatus::Running)
    }
}

/// What a job does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobConfigType {
    Sync,
    ResetConnection,
    Refresh,
    CheckConnectionSource,
    CheckConnectionDestination,
    DiscoverSchema,
    GetSpec,
}

impl JobConfigType {
    /// Job types that move data and therefore own stream statuses and sync stats.
    pub fn replication_types() -> [JobConfigType; 3] {
        [Self::Sync, Self::ResetConnection, Self::Refresh]
    }

    pub fn is_replication(&self) -> bool {
        Self::replication_types().contains(self)
    }
}
