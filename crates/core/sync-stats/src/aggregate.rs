use crate::{StreamStatsTotals, StreamSyncStats, SyncMode, SyncStats};

/// Combines per-stream statistics into run totals.
///
/// - [`SyncMode::Incremental`]: every counter is summed over all streams.
/// - [`SyncMode::FullRefresh`]: every counter is taken from the last stream of `stats`.
///
/// Unreported counters count as 0 in both modes. The full-refresh result depends on the order
/// of `stats`.
pub fn aggregate(mode: SyncMode, stats: &[StreamSyncStats]) -> StreamStatsTotals {
    match mode {
        SyncMode::Incremental => stats
            .iter()
            .map(|stream| totals(&stream.stats))
            .fold(StreamStatsTotals::default(), |acc, stream| {
                StreamStatsTotals {
                    records_emitted: acc.records_emitted.saturating_add(stream.records_emitted),
                    bytes_emitted: acc.bytes_emitted.saturating_add(stream.bytes_emitted),
                    records_committed: acc
                        .records_committed
                        .saturating_add(stream.records_committed),
                    bytes_committed: acc.bytes_committed.saturating_add(stream.bytes_committed),
                }
            }),
        SyncMode::FullRefresh => stats
            .last()
            .map(|stream| totals(&stream.stats))
            .unwrap_or_default(),
    }
}

/// Whether any stream of the run was backfilled.
///
/// `Some(true)` if any stream reports a backfill, otherwise `Some(false)` if any stream
/// explicitly reports none, otherwise `None`.
pub fn was_backfilled(stats: &[StreamSyncStats]) -> Option<bool> {
    stats
        .iter()
        .filter_map(|stream| stream.was_backfilled)
        .reduce(|acc, backfilled| acc || backfilled)
}

fn totals(stats: &SyncStats) -> StreamStatsTotals {
    StreamStatsTotals {
        records_emitted: stats.records_emitted.unwrap_or_default(),
        bytes_emitted: stats.bytes_emitted.unwrap_or_default(),
        records_committed: stats.records_committed.unwrap_or_default(),
        bytes_committed: stats.bytes_committed.unwrap_or_default(),
    }
}
