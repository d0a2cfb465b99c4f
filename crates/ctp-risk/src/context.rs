//! Shared risk context.
//!
//! One context is shared by every gate in the process. The bus handle is
//! attached exactly once; attaching also registers the process-wide
//! realtime check on the bus's timer signal.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::{debug, info};

use ctp_bus::BusHandle;
use ctp_core::{Clock, Event, EventKind, SystemClock};

use crate::error::{RiskError, RiskResult};

/// Continuous background risk check, driven by the bus's timer events
/// independently of any individual gated call.
///
/// The default policy is deliberately empty; implementers plug in
/// monitoring behavior here.
pub trait RealtimeCheck: Send + Sync {
    /// Called on every timer tick with the tick's timestamp.
    fn check(&self, now_ms: i64);
}

/// Placeholder policy: observes ticks, does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRealtimeCheck;

impl RealtimeCheck for NoopRealtimeCheck {
    fn check(&self, now_ms: i64) {
        debug!(now_ms, "realtime check tick");
    }
}

/// Process-wide context shared by all risk gates.
///
/// The bus reference is write-once, read-many; a second `attach` is
/// rejected rather than silently replacing the handle.
pub struct RiskContext {
    bus: OnceCell<BusHandle>,
    clock: Arc<dyn Clock>,
}

impl RiskContext {
    /// Create an unattached context using the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an unattached context with an injected clock.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            bus: OnceCell::new(),
            clock,
        }
    }

    /// Attach the bus and subscribe the shared realtime check to the
    /// timer signal. May be called exactly once.
    pub fn attach(&self, bus: BusHandle, check: Arc<dyn RealtimeCheck>) -> RiskResult<()> {
        self.bus
            .set(bus.clone())
            .map_err(|_| RiskError::AlreadyAttached)?;

        bus.register(
            EventKind::Timer,
            Arc::new(move |event| check.check(event.timestamp_ms)),
        );
        info!("risk context attached, realtime check registered");
        Ok(())
    }

    /// Whether `attach` has happened.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.bus.get().is_some()
    }

    /// Emit a log event through the bus. Before attach this degrades to
    /// tracing only; gate logging never blocks the call protocol.
    pub(crate) fn log(&self, message: String) {
        match self.bus.get() {
            Some(bus) => bus.put(Event::log(message, self.clock.now_ms())),
            None => debug!(message, "risk log before context attach"),
        }
    }
}

impl Default for RiskContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctp_bus::EventBus;
    use parking_lot::Mutex;
    use std::time::Duration;

    struct CountingCheck {
        ticks: Mutex<Vec<i64>>,
    }

    impl RealtimeCheck for CountingCheck {
        fn check(&self, now_ms: i64) {
            self.ticks.lock().push(now_ms);
        }
    }

    #[tokio::test]
    async fn test_attach_is_write_once() {
        let (bus, _join) = EventBus::spawn(16);
        let ctx = RiskContext::new();

        assert!(!ctx.is_attached());
        ctx.attach(bus.clone(), Arc::new(NoopRealtimeCheck)).unwrap();
        assert!(ctx.is_attached());

        let err = ctx.attach(bus, Arc::new(NoopRealtimeCheck)).unwrap_err();
        assert_eq!(err, RiskError::AlreadyAttached);
    }

    #[tokio::test]
    async fn test_realtime_check_runs_on_timer_events() {
        let (bus, _join) = EventBus::spawn(16);
        let ctx = RiskContext::new();
        let check = Arc::new(CountingCheck {
            ticks: Mutex::new(Vec::new()),
        });

        ctx.attach(bus.clone(), check.clone()).unwrap();

        bus.put(Event::timer(100));
        bus.put(Event::timer(200));
        // Log events must not reach the realtime check
        bus.put(Event::log("ignored", 300));
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(check.ticks.lock().as_slice(), [100, 200]);
    }

    #[test]
    fn test_log_before_attach_is_soft() {
        let ctx = RiskContext::new();
        // Must not panic or block
        ctx.log("early".to_string());
    }
}
