//! Per-stream sync statistics and their reduction into run-level totals.

mod aggregate;

pub use self::aggregate::{aggregate, was_backfilled};

/// Counters reported for a stream. A counter the connector did not report is `None`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStats {
    pub records_emitted: Option<u64>,
    pub bytes_emitted: Option<u64>,
    pub records_committed: Option<u64>,
    pub bytes_committed: Option<u64>,
}

/// Statistics of one stream of a sync.
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamSyncStats {
    pub stream_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_namespace: Option<String>,
    pub stats: SyncStats,
    /// Whether the stream ran a backfill. `None` when the connector did not say.
    #[serde(default)]
    pub was_backfilled: Option<bool>,
}

/// Run-level totals.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamStatsTotals {
    pub records_emitted: u64,
    pub bytes_emitted: u64,
    pub records_committed: u64,
    pub bytes_committed: u64,
}

/// Sync mode of a run.
///
/// Full-refresh streams report complete snapshots; incremental streams report deltas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    FullRefresh,
    Incremental,
}
