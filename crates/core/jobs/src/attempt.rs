use crate::job_id::JobId;

/// Position of an attempt within its job, starting at 0.
pub type AttemptNumber = u32;

/// One execution try of a job.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Attempt {
    pub number: AttemptNumber,
    pub job_id: JobId,
    pub status: AttemptStatus,
}

impl Attempt {
    pub fn new(number: AttemptNumber, job_id: JobId, status: AttemptStatus) -> Self {
        Self {
            number,
            job_id,
            status,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttemptStatus {
    Running,
    Failed,
    Succeeded,
}

impl AttemptStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "RUNNING",
            Self::Failed => "FAILED",
            Self::Succeeded => "SUCCEEDED",
        }
    }
}

impl std::fmt::Display for AttemptStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
