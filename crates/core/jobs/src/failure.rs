//! Attempt failure summaries, as written alongside a failed attempt.

use chrono::{DateTime, Utc};

use crate::{attempt::AttemptNumber, job_id::JobId};

/// The reasons an attempt failed.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptFailureSummary {
    pub failures: Vec<FailureReason>,
    /// Whether some data was committed before the attempt failed
    #[serde(default)]
    pub partial_success: bool,
}

impl AttemptFailureSummary {
    /// Summary for an attempt that was left running when the orchestrator restarted.
    pub fn workflow_restarted(
        job_id: JobId,
        attempt_number: AttemptNumber,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            failures: vec![FailureReason {
                origin: FailureOrigin::Platform,
                failure_type: FailureType::SystemError,
                external_message: "An internal transient error occurred. The sync should work \
                                   fine on the next retry."
                    .to_string(),
                internal_message: format!(
                    "Setting attempt {attempt_number} of job {job_id} to FAILED because the \
                     workflow for this connection was restarted, and existing job state was \
                     cleaned."
                ),
                timestamp,
            }],
            partial_success: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureReason {
    #[serde(rename = "failureOrigin")]
    pub origin: FailureOrigin,
    pub failure_type: FailureType,
    pub external_message: String,
    pub internal_message: String,
    pub timestamp: DateTime<Utc>,
}

/// Component the failure originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureOrigin {
    Source,
    Destination,
    Replication,
    Platform,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureType {
    ConfigError,
    SystemError,
    TransientError,
    ManualCancellation,
    DestinationTimeout,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone as _;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn workflow_restarted_summary_is_a_platform_system_error() {
        //* Given
        let timestamp = Utc.timestamp_opt(1_700_000_000, 0).unwrap();

        //* When
        let summary = AttemptFailureSummary::workflow_restarted(JobId::new(7), 2, timestamp);

        //* Then
        let json = serde_json::to_value(&summary).expect("summary serializes");
        assert_eq!(json["partialSuccess"], serde_json::json!(false));
        assert_eq!(json["failures"][0]["failureOrigin"], "platform");
        assert_eq!(json["failures"][0]["failureType"], "system_error");
        assert!(
            summary.failures[0]
                .internal_message
                .contains("attempt 2 of job 7"),
            "internal message names the attempt: {}",
            summary.failures[0].internal_message
        );
    }
}
