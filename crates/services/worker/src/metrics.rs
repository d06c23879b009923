use monitoring::telemetry;
use uuid::Uuid;

use crate::timeout::DestinationCall;

#[derive(Debug)]
pub struct MetricsRegistry {
    // Stalled destination calls, by the call that stalled.
    pub destination_accept_timeout: telemetry::metrics::ReadableCounter,
    pub destination_notify_end_of_input_timeout: telemetry::metrics::ReadableCounter,
}

impl MetricsRegistry {
    pub fn new(meter: &telemetry::metrics::Meter) -> Self {
        Self {
            destination_accept_timeout: telemetry::metrics::ReadableCounter::new(
                meter,
                "worker_destination_accept_timeout",
                "Counter for destination accept calls that exceeded the timeout",
            ),
            destination_notify_end_of_input_timeout: telemetry::metrics::ReadableCounter::new(
                meter,
                "worker_destination_notify_end_of_input_timeout",
                "Counter for destination notify-end-of-input calls that exceeded the timeout",
            ),
        }
    }

    pub(crate) fn inc_destination_timeout(&self, call: DestinationCall, connection_id: Uuid) {
        let kv_pairs = [telemetry::metrics::KeyValue::new(
            "connection_id",
            connection_id.to_string(),
        )];
        match call {
            DestinationCall::Accept => self.destination_accept_timeout.inc_with_kvs(&kv_pairs),
            DestinationCall::NotifyEndOfInput => self
                .destination_notify_end_of_input_timeout
                .inc_with_kvs(&kv_pairs),
        }
    }
}
