//! Forwarding of status changes to the durable stream status API.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jobs::{AttemptNumber, JobId};
use monitoring::logging;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::{
    emitter::{StreamStatusEmitter, StreamStatusUpdate},
    key::StreamKey,
    value::{RateLimitedInfo, RunState},
};

/// Error type for API client implementations
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Durable storage of stream statuses, owned by the control plane.
#[async_trait]
pub trait StreamStatusApi: Send + Sync {
    /// Creates the status record of a stream for the run.
    async fn create(
        &self,
        request: &StreamStatusRequest,
    ) -> Result<StreamStatusRecord, StreamStatusApiError>;

    /// Updates an existing status record.
    async fn update(
        &self,
        id: Uuid,
        request: &StreamStatusRequest,
    ) -> Result<StreamStatusRecord, StreamStatusApiError>;
}

/// A request to the stream status API failed
#[derive(Debug, thiserror::Error)]
#[error("stream status API request failed")]
pub struct StreamStatusApiError(#[source] pub BoxError);

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamStatusRequest {
    pub workspace_id: Uuid,
    pub connection_id: Uuid,
    pub job_id: JobId,
    pub attempt_number: AttemptNumber,
    pub stream_name: String,
    pub stream_namespace: Option<String>,
    pub run_state: RunState,
    pub metadata: Option<RateLimitedInfo>,
    pub transitioned_at: DateTime<Utc>,
}

impl From<&StreamStatusUpdate> for StreamStatusRequest {
    fn from(update: &StreamStatusUpdate) -> Self {
        Self {
            workspace_id: update.context.workspace_id,
            connection_id: update.context.connection_id,
            job_id: update.context.job_id,
            attempt_number: update.context.attempt_number,
            stream_name: update.key.name.clone(),
            stream_namespace: update.key.namespace.clone(),
            run_state: update.run_state,
            metadata: update.metadata,
            transitioned_at: update.transitioned_at,
        }
    }
}

/// A status record as stored by the API.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamStatusRecord {
    pub id: Uuid,
    pub run_state: RunState,
}

/// Last API response per stream of one run.
///
/// Lets the emitter update the record it created instead of creating a new one, and skip
/// calls that would not change the stored run state.
#[derive(Debug, Default)]
pub struct ResponseCache {
    records: Mutex<HashMap<StreamKey, StreamStatusRecord>>,
}

impl ResponseCache {
    pub fn get(&self, key: &StreamKey) -> Option<StreamStatusRecord> {
        self.records.lock().get(key).cloned()
    }

    pub fn insert(&self, key: StreamKey, record: StreamStatusRecord) {
        self.records.lock().insert(key, record);
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

/// Emitter that persists every status change through a [`StreamStatusApi`].
///
/// Create one per run: the response cache lives and dies with the emitter.
pub struct ReconcilingEmitter {
    api: Arc<dyn StreamStatusApi>,
    cache: ResponseCache,
}

impl ReconcilingEmitter {
    pub fn new(api: Arc<dyn StreamStatusApi>) -> Self {
        Self {
            api,
            cache: ResponseCache::default(),
        }
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Emits every update received on `rx` until all senders are dropped.
    pub async fn consume(&self, mut rx: mpsc::UnboundedReceiver<StreamStatusUpdate>) {
        while let Some(update) = rx.recv().await {
            self.emit(update).await;
        }
    }

    #[tracing::instrument(skip_all, err)]
    async fn reconcile(&self, update: &StreamStatusUpdate) -> Result<(), StreamStatusApiError> {
        let request = StreamStatusRequest::from(update);

        let record = match self.cache.get(&update.key) {
            Some(record) if record.run_state == update.run_state => {
                tracing::debug!(
                    stream = %update.key,
                    run_state = %update.run_state,
                    "run state already stored, skipping API call"
                );
                return Ok(());
            }
            Some(record) => self.api.update(record.id, &request).await?,
            None => self.api.create(&request).await?,
        };

        self.cache.insert(update.key.clone(), record);
        Ok(())
    }
}

#[async_trait]
impl StreamStatusEmitter for ReconcilingEmitter {
    async fn emit(&self, update: StreamStatusUpdate) {
        if let Err(err) = self.reconcile(&update).await {
            tracing::warn!(
                stream = %update.key,
                run_state = %update.run_state,
                error = %err,
                error_source = logging::error_source(&err),
                "failed to persist stream status"
            );
        }
    }
}
