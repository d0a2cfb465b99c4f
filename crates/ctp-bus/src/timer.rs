//! Periodic timer source.
//!
//! Emits `Timer` events onto the bus at a fixed interval so consumers
//! (e.g. the risk layer's realtime check) can run without owning a clock
//! loop of their own.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use ctp_core::{Clock, Event};

use crate::bus::BusHandle;

/// Run the timer loop until cancelled.
///
/// Each tick puts one `Timer` event stamped with the clock's current time.
/// Cancellation is observed at the tick boundary, so shutdown latency is
/// bounded by one interval.
pub async fn run_timer(
    bus: BusHandle,
    clock: Arc<dyn Clock>,
    interval: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    // The first tick fires immediately; skip it so emission starts one
    // interval after spawn.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("timer source cancelled");
                break;
            }
            _ = ticker.tick() => {
                bus.put(Event::timer(clock.now_ms()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::EventBus;
    use ctp_core::{EventKind, SystemClock};
    use parking_lot::Mutex;

    #[tokio::test]
    async fn test_timer_emits_until_cancelled() {
        let (bus, _join) = EventBus::spawn(32);
        let ticks: Arc<Mutex<u32>> = Arc::new(Mutex::new(0));

        let counter = ticks.clone();
        bus.register(EventKind::Timer, Arc::new(move |_| *counter.lock() += 1));

        let cancel = CancellationToken::new();
        let timer = tokio::spawn(run_timer(
            bus.clone(),
            Arc::new(SystemClock),
            Duration::from_millis(10),
            cancel.clone(),
        ));

        tokio::time::sleep(Duration::from_millis(55)).await;
        cancel.cancel();
        timer.await.unwrap();

        let count = *ticks.lock();
        assert!(count >= 2, "expected at least 2 ticks, got {count}");

        // No further ticks after cancellation
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(*ticks.lock(), count);
    }
}
