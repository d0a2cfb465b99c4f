//! Application wiring and lifecycle.
//!
//! Builds the bus, timer source, session scheduler, and query loop
//! around one [`SentinelHost`], runs them until shutdown, then cancels
//! and drains every task.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use ctp_bus::{run_timer, BusHandle, EventBus};
use ctp_core::{Clock, EventKind, HolidayCalendar, SystemClock};
use ctp_host::{ExtensionId, TradeHost};
use ctp_risk::{NoopRealtimeCheck, RiskContext};
use ctp_sched::{PeriodicQueryLoop, SessionScheduler};

use crate::config::AppConfig;
use crate::error::AppResult;
use crate::host::SentinelHost;

/// The assembled application.
pub struct Application {
    config: AppConfig,
    host: Arc<SentinelHost>,
    calendar: Arc<HolidayCalendar>,
    clock: Arc<dyn Clock>,
    risk: Arc<RiskContext>,
    cancel: CancellationToken,
}

impl Application {
    /// Assemble the application on the system clock.
    ///
    /// The session windows are venue-local; a deployment whose system
    /// clock does not run in the venue's zone must use [`Self::with_clock`]
    /// and inject a clock that does.
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Assemble the application with an injected clock.
    #[must_use]
    pub fn with_clock(config: AppConfig, clock: Arc<dyn Clock>) -> Self {
        let extensions: Vec<ExtensionId> = config
            .extensions
            .iter()
            .map(|name| ExtensionId::new(name.clone()))
            .collect();
        let host = Arc::new(SentinelHost::new(
            extensions,
            Duration::from_secs(config.refresh_interval_secs),
        ));
        let calendar = Arc::new(config.calendar());

        Self {
            config,
            host,
            calendar,
            clock,
            risk: Arc::new(RiskContext::new()),
            cancel: CancellationToken::new(),
        }
    }

    /// The host, for registering extensions or clearing flags at runtime.
    #[must_use]
    pub fn host(&self) -> Arc<SentinelHost> {
        self.host.clone()
    }

    /// The shared risk context for building gates against this app's bus.
    #[must_use]
    pub fn risk_context(&self) -> Arc<RiskContext> {
        self.risk.clone()
    }

    /// Token observed by every spawned loop.
    #[must_use]
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run until Ctrl-C, then cancel and drain all tasks.
    pub async fn run(self) -> AppResult<()> {
        let (bus, bus_join) = EventBus::spawn(self.config.bus_capacity);
        register_log_sink(&bus);

        // Bus attaches exactly once; a second app instance sharing this
        // context would be a wiring bug, surfaced here.
        self.risk.attach(bus.clone(), Arc::new(NoopRealtimeCheck))?;

        let clock = self.clock.clone();

        let timer = tokio::spawn(run_timer(
            bus.clone(),
            clock.clone(),
            Duration::from_secs(self.config.timer_interval_secs),
            self.cancel.clone(),
        ));

        let scheduler = SessionScheduler::new(
            self.host.clone(),
            self.calendar.clone(),
            clock.clone(),
            bus.clone(),
            Duration::from_secs(self.config.scheduler_tick_secs),
            self.cancel.clone(),
        );
        let scheduler_task = tokio::spawn(scheduler.run());

        let query_loop = PeriodicQueryLoop::new(
            self.host.clone(),
            self.calendar.clone(),
            clock,
            Duration::from_secs(self.config.query_tick_secs),
            self.cancel.clone(),
        );
        let query_task = tokio::spawn(query_loop.run());

        info!(
            label = %self.config.label,
            extensions = self.host.extensions().len(),
            "application started"
        );

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown signal received");
            }
            _ = self.cancel.cancelled() => {
                info!("cancellation requested");
            }
        }

        self.shutdown(bus, timer, scheduler_task, query_task, bus_join)
            .await;
        Ok(())
    }

    /// Cancel every loop and wait for each to drain.
    async fn shutdown(
        &self,
        bus: BusHandle,
        timer: tokio::task::JoinHandle<()>,
        scheduler: tokio::task::JoinHandle<()>,
        query: tokio::task::JoinHandle<()>,
        bus_join: tokio::task::JoinHandle<()>,
    ) {
        self.host.flags().clear_all();
        self.cancel.cancel();

        for (name, task) in [("timer", timer), ("scheduler", scheduler), ("query", query)] {
            if let Err(error) = task.await {
                warn!(task = name, %error, "task did not shut down cleanly");
            }
        }

        // The risk context keeps a bus handle for the process lifetime,
        // so the dispatcher never runs out of senders; stop it directly.
        drop(bus);
        bus_join.abort();
        let _ = bus_join.await;
        info!("application stopped");
    }
}

/// Forward bus log events into the tracing pipeline.
fn register_log_sink(bus: &BusHandle) {
    bus.register(
        EventKind::Log,
        Arc::new(|event| info!(timestamp_ms = event.timestamp_ms, "{}", event.payload)),
    );
}
