use chrono::DateTime;
use pretty_assertions::assert_eq;
use protocol::{Message, StateId, StreamDescriptor, StreamStatus};

use super::utils::{
    UnavailableFlags, key, rate_limited, rate_limited_messages, record, state, stream_status,
    tracker, users,
};
use crate::{RateLimitedInfo, RunState};

#[tokio::test]
async fn started_moves_stream_to_running() {
    //* Given
    let tracker = tracker(rate_limited_messages(false));

    //* When
    tracker
        .track(&stream_status(&users(), StreamStatus::Started))
        .await;

    //* Then
    let updates = tracker.emitter().updates();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].key, key(&users()));
    assert_eq!(updates[0].run_state, RunState::Running);
    assert_eq!(updates[0].context, *tracker.context());
}

#[tokio::test]
async fn repeated_status_emits_a_single_update() {
    //* Given
    let tracker = tracker(rate_limited_messages(false));

    //* When
    tracker
        .track(&stream_status(&users(), StreamStatus::Started))
        .await;
    tracker
        .track(&stream_status(&users(), StreamStatus::Running))
        .await;
    tracker.track(&record(&users())).await;

    //* Then
    assert_eq!(tracker.emitter().updates().len(), 1);
}

#[tokio::test]
async fn rate_limited_trace_with_flag_enabled_sets_rate_limited() {
    //* Given
    let tracker = tracker(rate_limited_messages(true));
    tracker
        .track(&stream_status(&users(), StreamStatus::Started))
        .await;

    //* When
    tracker.track(&rate_limited(&users(), 1_700_000_000_000)).await;

    //* Then
    let updates = tracker.emitter().updates();
    assert_eq!(updates.len(), 2);
    assert_eq!(updates[1].run_state, RunState::RateLimited);
    assert_eq!(
        updates[1].metadata,
        Some(RateLimitedInfo {
            quota_reset: DateTime::from_timestamp_millis(1_700_000_000_000),
        })
    );
}

#[tokio::test]
async fn rate_limited_trace_with_flag_disabled_stays_running() {
    //* Given
    let tracker = tracker(rate_limited_messages(false));
    tracker
        .track(&stream_status(&users(), StreamStatus::Started))
        .await;

    //* When
    tracker.track(&rate_limited(&users(), 1_700_000_000_000)).await;

    //* Then
    assert_eq!(tracker.emitter().updates().len(), 1);
    let value = tracker.store().get(&key(&users())).expect("stream tracked");
    assert_eq!(value.run_state, RunState::Running);
    assert_eq!(value.metadata, None);
}

#[tokio::test]
async fn rate_limited_trace_with_failing_flag_service_stays_running() {
    //* Given
    let tracker = tracker(std::sync::Arc::new(UnavailableFlags));

    //* When
    tracker.track(&rate_limited(&users(), 1_700_000_000_000)).await;

    //* Then
    let updates = tracker.emitter().updates();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].run_state, RunState::Running);
}

#[tokio::test]
async fn record_while_rate_limited_returns_to_running() {
    //* Given
    let tracker = tracker(rate_limited_messages(true));
    tracker.track(&rate_limited(&users(), 1_700_000_000_000)).await;

    //* When
    tracker.track(&record(&users())).await;

    //* Then
    let updates = tracker.emitter().updates();
    assert_eq!(updates.len(), 2);
    assert_eq!(updates[1].run_state, RunState::Running);
    assert_eq!(updates[1].metadata, None);

    let value = tracker.store().get(&key(&users())).expect("stream tracked");
    assert!(!value.is_empty);
}

#[tokio::test]
async fn unacknowledged_state_advances_latest_state_id() {
    //* Given
    let tracker = tracker(rate_limited_messages(false));
    tracker
        .track(&stream_status(&users(), StreamStatus::Started))
        .await;

    //* When
    tracker.track(&state(&users(), 1)).await;
    tracker.track(&state(&users(), 2)).await;

    //* Then
    let value = tracker.store().get(&key(&users())).expect("stream tracked");
    assert_eq!(value.latest_state_id, Some(StateId::new(2)));
    assert_eq!(value.run_state, RunState::Running);
    assert_eq!(tracker.emitter().updates().len(), 1);
}

#[tokio::test]
async fn acknowledged_final_state_completes_the_stream() {
    //* Given
    let tracker = tracker(rate_limited_messages(false));
    tracker
        .track(&stream_status(&users(), StreamStatus::Started))
        .await;
    tracker.track(&record(&users())).await;
    tracker.track(&state(&users(), 3)).await;
    tracker
        .track(&stream_status(&users(), StreamStatus::Complete))
        .await;

    //* When
    tracker.track(&state(&users(), 3)).await;

    //* Then
    let updates = tracker.emitter().updates();
    let states: Vec<_> = updates.iter().map(|update| update.run_state).collect();
    assert_eq!(states, [RunState::Running, RunState::Complete]);
}

#[tokio::test]
async fn incomplete_is_terminal() {
    //* Given
    let tracker = tracker(rate_limited_messages(false));
    tracker
        .track(&stream_status(&users(), StreamStatus::Started))
        .await;
    tracker
        .track(&stream_status(&users(), StreamStatus::Incomplete))
        .await;

    //* When
    tracker.track(&record(&users())).await;
    tracker
        .track(&stream_status(&users(), StreamStatus::Started))
        .await;

    //* Then
    let states: Vec<_> = tracker
        .emitter()
        .updates()
        .iter()
        .map(|update| update.run_state)
        .collect();
    assert_eq!(states, [RunState::Running, RunState::Incomplete]);
}

#[tokio::test]
async fn complete_is_terminal() {
    //* Given
    let tracker = tracker(rate_limited_messages(true));
    tracker
        .track(&stream_status(&users(), StreamStatus::Started))
        .await;
    tracker.track(&state(&users(), 3)).await;
    tracker
        .track(&stream_status(&users(), StreamStatus::Complete))
        .await;
    tracker.track(&state(&users(), 3)).await;
    let completed = tracker.store().get(&key(&users())).expect("stream tracked");

    //* When
    tracker.track(&record(&users())).await;
    tracker
        .track(&stream_status(&users(), StreamStatus::Started))
        .await;
    tracker.track(&rate_limited(&users(), 1_700_000_000_000)).await;
    tracker.track(&state(&users(), 4)).await;

    //* Then
    let states: Vec<_> = tracker
        .emitter()
        .updates()
        .iter()
        .map(|update| update.run_state)
        .collect();
    assert_eq!(states, [RunState::Running, RunState::Complete]);

    let value = tracker.store().get(&key(&users())).expect("stream tracked");
    assert_eq!(value, completed);
    assert_eq!(value.run_state, RunState::Complete);
    assert_eq!(value.latest_state_id, Some(StateId::new(3)));
    assert!(value.is_empty, "records after completion must not count");
}

#[tokio::test]
async fn messages_without_stream_status_are_ignored() {
    //* Given
    let tracker = tracker(rate_limited_messages(false));
    let log: Message = serde_json::from_value(serde_json::json!({
        "type": "LOG",
        "log": {"level": "INFO", "message": "hello"}
    }))
    .expect("valid log message");
    let global_state: Message = serde_json::from_value(serde_json::json!({
        "type": "STATE",
        "state": {"type": "GLOBAL", "id": 9}
    }))
    .expect("valid global state message");

    //* When
    tracker.track(&log).await;
    tracker.track(&global_state).await;

    //* Then
    assert!(tracker.store().is_empty());
    assert!(tracker.emitter().updates().is_empty());
}

#[tokio::test]
async fn every_run_state_change_is_emitted_exactly_once() {
    //* Given
    let tracker = tracker(rate_limited_messages(true));
    let orders = StreamDescriptor::new("orders", None::<String>);
    let messages = [
        stream_status(&users(), StreamStatus::Started),
        stream_status(&orders, StreamStatus::Started),
        record(&users()),
        rate_limited(&users(), 1),
        rate_limited(&users(), 2),
        record(&orders),
        record(&users()),
        state(&users(), 1),
        stream_status(&orders, StreamStatus::Running),
        state(&orders, 2),
        stream_status(&users(), StreamStatus::Complete),
        stream_status(&orders, StreamStatus::Incomplete),
        state(&users(), 1),
        record(&orders),
    ];

    //* When
    let mut expected = Vec::new();
    for message in &messages {
        let before = tracker.store().snapshot();
        tracker.track(message).await;
        let after = tracker.store().snapshot();

        for (key, value) in &after {
            let previous = before
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.run_state)
                .unwrap_or_default();
            if previous != value.run_state {
                expected.push((key.clone(), value.run_state));
            }
        }
    }

    //* Then
    let emitted: Vec<_> = tracker
        .emitter()
        .updates()
        .into_iter()
        .map(|update| (update.key, update.run_state))
        .collect();
    assert_eq!(emitted, expected);
    assert_eq!(
        tracker
            .store()
            .get(&key(&users()))
            .map(|value| value.run_state),
        Some(RunState::Complete)
    );
}
