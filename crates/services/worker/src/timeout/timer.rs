use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use tokio::time::Instant;

use super::DestinationCall;

/// Marks a stopped timer
const STOPPED: u64 = 0;

/// Start instant of a destination call, shared between the caller and the watchdog.
///
/// The instant is stored as milliseconds since `origin`, offset by one so that zero can mean
/// "stopped".
#[derive(Debug)]
struct CallTimer {
    origin: Instant,
    started_at: AtomicU64,
}

impl CallTimer {
    fn new(origin: Instant) -> Self {
        Self {
            origin,
            started_at: AtomicU64::new(STOPPED),
        }
    }

    /// Starts the timer, discarding any time accumulated by a previous start.
    fn start(&self) {
        let offset = Instant::now().saturating_duration_since(self.origin);
        let millis = u64::try_from(offset.as_millis()).unwrap_or(u64::MAX - 1);
        self.started_at.store(millis + 1, Ordering::Release);
    }

    fn reset(&self) {
        self.started_at.store(STOPPED, Ordering::Release);
    }

    fn elapsed(&self) -> Option<Duration> {
        match self.started_at.load(Ordering::Acquire) {
            STOPPED => None,
            millis => {
                let started_at = self.origin + Duration::from_millis(millis - 1);
                Some(Instant::now().saturating_duration_since(started_at))
            }
        }
    }
}

/// Timers of the two monitored destination calls.
#[derive(Debug)]
pub(super) struct Timers {
    accept: CallTimer,
    notify_end_of_input: CallTimer,
}

impl Timers {
    pub(super) fn new() -> Self {
        let origin = Instant::now();
        Self {
            accept: CallTimer::new(origin),
            notify_end_of_input: CallTimer::new(origin),
        }
    }

    pub(super) fn start(&self, call: DestinationCall) {
        self.timer(call).start();
    }

    pub(super) fn reset(&self, call: DestinationCall) {
        self.timer(call).reset();
    }

    pub(super) fn elapsed(&self, call: DestinationCall) -> Option<Duration> {
        self.timer(call).elapsed()
    }

    /// Returns the first call, accept before notify-end-of-input, running for longer than
    /// `timeout`.
    pub(super) fn timed_out(&self, timeout: Duration) -> Option<DestinationCall> {
        [DestinationCall::Accept, DestinationCall::NotifyEndOfInput]
            .into_iter()
            .find(|call| self.elapsed(*call).is_some_and(|elapsed| elapsed > timeout))
    }

    fn timer(&self, call: DestinationCall) -> &CallTimer {
        match call {
            DestinationCall::Accept => &self.accept,
            DestinationCall::NotifyEndOfInput => &self.notify_end_of_input,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn timed_out_only_after_the_timeout_is_exceeded() {
        //* Given
        let timers = Timers::new();
        let timeout = Duration::from_secs(60);
        timers.start(DestinationCall::Accept);

        //* When
        tokio::time::advance(Duration::from_secs(60)).await;
        let at_timeout = timers.timed_out(timeout);
        tokio::time::advance(Duration::from_secs(1)).await;
        let past_timeout = timers.timed_out(timeout);

        //* Then
        assert_eq!(at_timeout, None);
        assert_eq!(past_timeout, Some(DestinationCall::Accept));
    }

    #[tokio::test(start_paused = true)]
    async fn start_restarts_a_running_timer() {
        //* Given
        let timers = Timers::new();
        timers.start(DestinationCall::NotifyEndOfInput);
        tokio::time::advance(Duration::from_secs(50)).await;

        //* When
        timers.start(DestinationCall::NotifyEndOfInput);
        tokio::time::advance(Duration::from_secs(20)).await;

        //* Then
        assert_eq!(
            timers.elapsed(DestinationCall::NotifyEndOfInput),
            Some(Duration::from_secs(20))
        );
        assert_eq!(timers.timed_out(Duration::from_secs(60)), None);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_stops_the_timer() {
        //* Given
        let timers = Timers::new();
        timers.start(DestinationCall::Accept);
        tokio::time::advance(Duration::from_secs(120)).await;

        //* When
        timers.reset(DestinationCall::Accept);

        //* Then
        assert_eq!(timers.elapsed(DestinationCall::Accept), None);
        assert_eq!(timers.timed_out(Duration::from_secs(60)), None);
    }
}
