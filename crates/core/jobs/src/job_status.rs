//! Job status enumeration and related implementations

/// Represents the current status of a job
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    /// Job is waiting to be picked up.
    ///
    /// This is the initial state of a job.
    #[default]
    Pending,

    /// Job is running
    ///
    /// An attempt of the job is being executed.
    Running,

    /// Job has an unsuccessful attempt and will be retried
    Incomplete,

    /// Job has failed
    ///
    /// This is a terminal state.
    Failed,

    /// Job has finished successfully
    ///
    /// This is a terminal state.
    Succeeded,

    /// Job was cancelled by a user or by the platform
    ///
    /// This is a terminal state.
    Cancelled,
}

impl JobStatus {
    /// Convert the [`JobStatus`] to a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Running => "RUNNING",
            Self::Incomplete => "INCOMPLETE",
            Self::Failed => "FAILED",
            Self::Succeeded => "SUCCEEDED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Returns true if the job status is terminal (cannot be changed further)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Failed | Self::Succeeded | Self::Cancelled)
    }

    /// Returns an array of all terminal job statuses
    pub fn terminal_statuses() -> [JobStatus; 3] {
        [Self::Failed, Self::Succeeded, Self::Cancelled]
    }

    /// Returns an array of all non-terminal (active) job statuses
    ///
    /// Jobs left in one of these statuses by a crashed orchestrator need to be closed out.
    pub fn non_terminal_statuses() -> [JobStatus; 3] {
        [Self::Pending, Self::Running, Self::Incomplete]
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_and_non_terminal_statuses_partition_all_statuses() {
        //* Given
        let all = [
            JobStatus::Pending,
            JobStatus::Running,
            JobStatus::Incomplete,
            JobStatus::Failed,
            JobStatus::Succeeded,
            JobStatus::Cancelled,
        ];

        //* Then
        for status in all {
            let in_terminal = JobStatus::terminal_statuses().contains(&status);
            let in_non_terminal = JobStatus::non_terminal_statuses().contains(&status);
            assert_ne!(in_terminal, in_non_terminal, "{status} must be in exactly one set");
            assert_eq!(status.is_terminal(), in_terminal);
        }
    }
}
