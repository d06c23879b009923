use feature_flags::FlagContext;
use jobs::{AttemptNumber, JobId};
use uuid::Uuid;

/// The run a tracker reports for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunContext {
    pub workspace_id: Uuid,
    pub connection_id: Uuid,
    pub job_id: JobId,
    pub attempt_number: AttemptNumber,
}

impl RunContext {
    pub fn flag_context(&self) -> FlagContext {
        FlagContext::new(self.workspace_id, self.connection_id)
    }
}
