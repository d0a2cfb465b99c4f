//! Session state machine driving extension enable/suspend.
//!
//! The scheduler polls wall-clock time against the trading calendar and
//! the session windows, and acts only on edges: entering a live window
//! reloads the host and enables every known extension, leaving it
//! suspends them all. Repeated identical readings are no-ops, so the host
//! never sees duplicate enable/suspend sweeps.
//!
//! Instants come from the injected [`Clock`], which is assumed to run in
//! the venue's local time (the session windows are venue-local).

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use ctp_bus::BusHandle;
use ctp_core::{is_active_session, Clock, Event, TradingCalendar};
use ctp_host::DynTradeHost;

// ============================================================================
// SessionState / transition planning
// ============================================================================

/// Scheduler session state. Owned exclusively by the scheduler; mutated
/// only on a detected transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Extensions are out of service.
    Suspended,
    /// Extensions are in service.
    Running,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Suspended => write!(f, "suspended"),
            Self::Running => write!(f, "running"),
        }
    }
}

/// Host mutation performed on a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepAction {
    /// Reload host state, then enable every known extension.
    EnableAll,
    /// Suspend every known extension.
    SuspendAll,
}

/// Evaluate one tick of the transition table.
///
/// Only the two transitioning cells return an action; the two stable
/// cells are explicit no-ops. This is what keeps the loop from firing
/// enable/suspend on every tick.
#[must_use]
pub fn plan_transition(
    state: SessionState,
    should_run: bool,
) -> (Option<SweepAction>, SessionState) {
    match (state, should_run) {
        (SessionState::Suspended, true) => (Some(SweepAction::EnableAll), SessionState::Running),
        (SessionState::Running, true) => (None, SessionState::Running),
        (SessionState::Running, false) => (Some(SweepAction::SuspendAll), SessionState::Suspended),
        (SessionState::Suspended, false) => (None, SessionState::Suspended),
    }
}

// ============================================================================
// SessionScheduler
// ============================================================================

/// Drives the enable/suspend hysteresis over a fixed-interval tick.
pub struct SessionScheduler {
    host: DynTradeHost,
    calendar: Arc<dyn TradingCalendar>,
    clock: Arc<dyn Clock>,
    bus: BusHandle,
    tick: Duration,
    cancel: CancellationToken,
    state: SessionState,
}

impl SessionScheduler {
    /// Create a scheduler in the initial `Suspended` state.
    #[must_use]
    pub fn new(
        host: DynTradeHost,
        calendar: Arc<dyn TradingCalendar>,
        clock: Arc<dyn Clock>,
        bus: BusHandle,
        tick: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            host,
            calendar,
            clock,
            bus,
            tick,
            cancel,
            state: SessionState::Suspended,
        }
    }

    /// Current session state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the system should currently be live: a trading day per the
    /// calendar, and inside a session window.
    fn should_run_at(&self, now: DateTime<Utc>) -> bool {
        let calendar_ok = self.calendar.is_trading_day(now.date_naive());
        let window_ok = is_active_session(now.naive_utc());
        calendar_ok && window_ok
    }

    /// Run until the host's run flag clears or the token is cancelled.
    ///
    /// Termination is checked once per tick, never mid-transition, so a
    /// sweep is observed as atomic by anything polling once per tick.
    pub async fn run(mut self) {
        info!(tick_ms = self.tick.as_millis() as u64, "session scheduler started");
        let mut ticker = tokio::time::interval(self.tick);

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("session scheduler cancelled");
                    break;
                }
                _ = ticker.tick() => {}
            }

            if !self.host.run_flag() {
                info!("run flag cleared, session scheduler stopping");
                break;
            }

            let now = self.clock.now();
            let should_run = self.should_run_at(now);
            self.on_tick(should_run, now);
        }
    }

    /// Apply one tick's transition. Host mutation always completes before
    /// the log event is emitted.
    fn on_tick(&mut self, should_run: bool, now: DateTime<Utc>) {
        let (action, next) = plan_transition(self.state, should_run);

        match action {
            Some(SweepAction::EnableAll) => {
                self.host.reload();
                self.sweep(now, |host, id| host.enable_extension(id), "enable");
                self.log_transition(
                    format!("session live, extensions enabled, time: {now}"),
                    now,
                );
            }
            Some(SweepAction::SuspendAll) => {
                self.sweep(now, |host, id| host.suspend_extension(id), "suspend");
                self.log_transition(
                    format!("outside trading window, extensions suspended, time: {now}"),
                    now,
                );
            }
            None => {
                debug!(state = %self.state, should_run, "no transition");
            }
        }

        self.state = next;
    }

    /// Visit every known extension. Per-extension failures are logged and
    /// the sweep continues, so no partial state persists past the tick.
    fn sweep<F>(&self, now: DateTime<Utc>, mut mutate: F, verb: &str)
    where
        F: FnMut(&dyn ctp_host::TradeHost, &ctp_host::ExtensionId) -> ctp_host::HostResult<()>,
    {
        for id in self.host.extensions() {
            if let Err(error) = mutate(self.host.as_ref(), &id) {
                warn!(extension = %id, %error, time = %now, "failed to {verb} extension");
            }
        }
    }

    /// Emit the transition log. Logging failure is non-fatal and never
    /// precedes the host mutation.
    fn log_transition(&self, message: String, now: DateTime<Utc>) {
        info!(state_change = %message);
        self.bus.put(Event::log(message, now.timestamp_millis()));
    }
}

// ============================================================================
// Tests
// ============================================================================
