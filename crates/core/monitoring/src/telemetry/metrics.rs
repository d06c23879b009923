//! Counters over the global OpenTelemetry meter provider.

use std::{
    borrow::Cow,
    sync::atomic::{AtomicU64, Ordering},
};

pub use opentelemetry::{KeyValue, metrics::Meter};

/// An OpenTelemetry counter that keeps a local copy of its total so it can be read back.
///
/// Counts are exported by whichever meter provider the service installed globally; without one
/// the OpenTelemetry side is a no-op and only the local copy counts.
#[derive(Debug)]
pub struct ReadableCounter {
    counter: opentelemetry::metrics::Counter<u64>,
    copy: AtomicU64,
}

impl ReadableCounter {
    /// Create a new readable OpenTelemetry counter.
    pub fn new(
        meter: &Meter,
        name: impl Into<Cow<'static, str>>,
        description: impl Into<Cow<'static, str>>,
    ) -> Self {
        let counter = meter
            .u64_counter(name)
            .with_description(description)
            .build();

        Self {
            counter,
            copy: AtomicU64::new(0),
        }
    }

    /// Increment the counter by one with additional key-value pairs.
    ///
    /// The local copy is the total over all key-value combinations.
    pub fn inc_with_kvs(&self, kv_pairs: &[KeyValue]) {
        self.counter.add(1, kv_pairs);
        self.copy.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the counter by one.
    pub fn inc(&self) {
        self.inc_with_kvs(&[]);
    }

    /// Get the current counter value.
    pub fn get(&self) -> u64 {
        self.copy.load(Ordering::Relaxed)
    }
}
