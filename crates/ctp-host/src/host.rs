//! The host trait and run/stop flags.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::error::HostResult;
use crate::extension::ExtensionId;

/// Host/App collaborator consumed by the scheduler and query loop.
///
/// The host is the single source of truth for the extension registry and
/// the run flags. Only the scheduler mutates extension state; each loop
/// reads only its own stop flag.
pub trait TradeHost: Send + Sync {
    /// Scheduler keeps running while this is set.
    fn run_flag(&self) -> bool;

    /// Query loop keeps running while this is set.
    fn query_flag(&self) -> bool;

    /// Refresh host-side state before re-enabling extensions.
    fn reload(&self);

    /// Current set of known extensions.
    fn extensions(&self) -> Vec<ExtensionId>;

    /// Bring one extension into service.
    fn enable_extension(&self, id: &ExtensionId) -> HostResult<()>;

    /// Take one extension out of service.
    fn suspend_extension(&self, id: &ExtensionId) -> HostResult<()>;

    /// Issue a position refresh query. Fire-and-forget; failures are the
    /// host's concern.
    fn query_position(&self);

    /// Issue an account refresh query. Fire-and-forget.
    fn query_account(&self);

    /// Spacing between the position and account queries. Read at the
    /// moment of use so a live config change applies on the next cycle.
    fn refresh_interval(&self) -> Duration;
}

/// Arc wrapper for host trait objects.
pub type DynTradeHost = Arc<dyn TradeHost>;

/// Atomic run/query flags for host implementations.
///
/// Both flags start set; clearing one ends the corresponding loop at its
/// next check point.
#[derive(Debug)]
pub struct HostFlags {
    run: AtomicBool,
    query: AtomicBool,
}

impl HostFlags {
    /// Create flags with both loops allowed to run.
    #[must_use]
    pub fn new() -> Self {
        Self {
            run: AtomicBool::new(true),
            query: AtomicBool::new(true),
        }
    }

    /// Whether the scheduler may keep running.
    #[must_use]
    pub fn run(&self) -> bool {
        self.run.load(Ordering::Acquire)
    }

    /// Whether the query loop may keep running.
    #[must_use]
    pub fn query(&self) -> bool {
        self.query.load(Ordering::Acquire)
    }

    /// Stop the scheduler at its next tick.
    pub fn clear_run(&self) {
        self.run.store(false, Ordering::Release);
    }

    /// Stop the query loop at its next cycle.
    pub fn clear_query(&self) {
        self.query.store(false, Ordering::Release);
    }

    /// Stop both loops.
    pub fn clear_all(&self) {
        self.clear_run();
        self.clear_query();
    }
}

impl Default for HostFlags {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_start_set() {
        let flags = HostFlags::new();
        assert!(flags.run());
        assert!(flags.query());
    }

    #[test]
    fn test_clear_is_independent() {
        let flags = HostFlags::new();
        flags.clear_run();
        assert!(!flags.run());
        assert!(flags.query());

        flags.clear_query();
        assert!(!flags.query());
    }

    #[test]
    fn test_clear_all() {
        let flags = HostFlags::new();
        flags.clear_all();
        assert!(!flags.run());
        assert!(!flags.query());
    }
}
