//! Periodic position/account refresh loop.
//!
//! Runs independently of the session scheduler. Each cycle is gated on
//! the calendar and the session windows; while gated out, no queries are
//! issued at all. While live, the position query and the account query
//! are spaced by the host's refresh interval, read at the moment it is
//! used so a live config change applies on the next cycle.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use ctp_core::{is_active_session, Clock, TradingCalendar};
use ctp_host::DynTradeHost;

/// State-refresh loop, live only inside trading sessions.
pub struct PeriodicQueryLoop {
    host: DynTradeHost,
    calendar: Arc<dyn TradingCalendar>,
    clock: Arc<dyn Clock>,
    tick: Duration,
    cancel: CancellationToken,
}

impl PeriodicQueryLoop {
    /// Create the loop. `tick` paces the liveness gate, not the queries.
    #[must_use]
    pub fn new(
        host: DynTradeHost,
        calendar: Arc<dyn TradingCalendar>,
        clock: Arc<dyn Clock>,
        tick: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            host,
            calendar,
            clock,
            tick,
            cancel,
        }
    }

    /// A cycle is live when today is a trading day and the instant is
    /// inside a session window.
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.calendar.is_trading_day(now.date_naive()) && is_active_session(now.naive_utc())
    }

    /// Run until the host's query flag clears or the token is cancelled.
    ///
    /// Both the gate tick and the refresh-interval wait are cancellable,
    /// so shutdown latency is bounded by the in-flight query only.
    pub async fn run(self) {
        info!(tick_ms = self.tick.as_millis() as u64, "query loop started");
        let mut ticker = tokio::time::interval(self.tick);

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("query loop cancelled");
                    return;
                }
                _ = ticker.tick() => {}
            }

            if !self.is_live(self.clock.now()) {
                trace!("outside trading session, skipping refresh cycle");
                continue;
            }

            self.host.query_position();

            // Read the spacing now, not at loop start
            let spacing = self.host.refresh_interval();
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("query loop cancelled during refresh wait");
                    return;
                }
                _ = tokio::time::sleep(spacing) => {}
            }

            // A suspend transition may have landed during the wait;
            // re-check rather than trusting the start-of-cycle reading.
            if self.is_live(self.clock.now()) {
                self.host.query_account();
            } else {
                debug!("session closed during refresh wait, account query skipped");
            }

            if !self.host.query_flag() {
                info!("query flag cleared, query loop stopping");
                return;
            }
        }
    }
}
