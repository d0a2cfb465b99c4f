//! In-memory host for tests and harnesses.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;

use crate::error::HostResult;
use crate::extension::ExtensionId;
use crate::host::{HostFlags, TradeHost};

/// Recording host: counts every call and keeps a simple enabled-set.
///
/// Used to verify scheduler/query-loop interaction without a real broker
/// connection behind the host.
#[derive(Debug)]
pub struct RecordingHost {
    flags: HostFlags,
    extensions: Vec<ExtensionId>,
    enabled: RwLock<Vec<ExtensionId>>,
    refresh_interval: RwLock<Duration>,
    reloads: AtomicU64,
    enables: AtomicU64,
    suspends: AtomicU64,
    position_queries: AtomicU64,
    account_queries: AtomicU64,
}

impl RecordingHost {
    /// Create a host with the given extension set.
    #[must_use]
    pub fn new(extensions: Vec<ExtensionId>) -> Self {
        Self {
            flags: HostFlags::new(),
            extensions,
            enabled: RwLock::new(Vec::new()),
            refresh_interval: RwLock::new(Duration::from_millis(5)),
            reloads: AtomicU64::new(0),
            enables: AtomicU64::new(0),
            suspends: AtomicU64::new(0),
            position_queries: AtomicU64::new(0),
            account_queries: AtomicU64::new(0),
        }
    }

    /// Shared flags, for clearing run/query from a test.
    #[must_use]
    pub fn flags(&self) -> &HostFlags {
        &self.flags
    }

    /// Change the query spacing; takes effect on the next cycle.
    pub fn set_refresh_interval(&self, interval: Duration) {
        *self.refresh_interval.write() = interval;
    }

    /// Extensions currently enabled.
    #[must_use]
    pub fn enabled_extensions(&self) -> Vec<ExtensionId> {
        self.enabled.read().clone()
    }

    /// Total `reload` calls.
    #[must_use]
    pub fn reload_count(&self) -> u64 {
        self.reloads.load(Ordering::Relaxed)
    }

    /// Total `enable_extension` calls.
    #[must_use]
    pub fn enable_count(&self) -> u64 {
        self.enables.load(Ordering::Relaxed)
    }

    /// Total `suspend_extension` calls.
    #[must_use]
    pub fn suspend_count(&self) -> u64 {
        self.suspends.load(Ordering::Relaxed)
    }

    /// Total `query_position` calls.
    #[must_use]
    pub fn position_query_count(&self) -> u64 {
        self.position_queries.load(Ordering::Relaxed)
    }

    /// Total `query_account` calls.
    #[must_use]
    pub fn account_query_count(&self) -> u64 {
        self.account_queries.load(Ordering::Relaxed)
    }
}

impl TradeHost for RecordingHost {
    fn run_flag(&self) -> bool {
        self.flags.run()
    }

    fn query_flag(&self) -> bool {
        self.flags.query()
    }

    fn reload(&self) {
        self.reloads.fetch_add(1, Ordering::Relaxed);
    }

    fn extensions(&self) -> Vec<ExtensionId> {
        self.extensions.clone()
    }

    fn enable_extension(&self, id: &ExtensionId) -> HostResult<()> {
        self.enables.fetch_add(1, Ordering::Relaxed);
        let mut enabled = self.enabled.write();
        if !enabled.contains(id) {
            enabled.push(id.clone());
        }
        Ok(())
    }

    fn suspend_extension(&self, id: &ExtensionId) -> HostResult<()> {
        self.suspends.fetch_add(1, Ordering::Relaxed);
        self.enabled.write().retain(|e| e != id);
        Ok(())
    }

    fn query_position(&self) {
        self.position_queries.fetch_add(1, Ordering::Relaxed);
    }

    fn query_account(&self) {
        self.account_queries.fetch_add(1, Ordering::Relaxed);
    }

    fn refresh_interval(&self) -> Duration {
        *self.refresh_interval.read()
    }
}

/// Convenience constructor returning an `Arc`ed host.
#[must_use]
pub fn recording_host(names: &[&str]) -> Arc<RecordingHost> {
    Arc::new(RecordingHost::new(
        names.iter().map(|n| ExtensionId::from(*n)).collect(),
    ))
}
