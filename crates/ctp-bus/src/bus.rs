//! Dispatcher and handle types.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use ctp_core::{Event, EventKind};

/// A registered event handler.
pub type Handler = Arc<dyn Fn(&Event) + Send + Sync>;

/// Handle for producing events and registering handlers.
///
/// Cheap to clone; all clones feed the same dispatcher.
#[derive(Clone)]
pub struct BusHandle {
    tx: mpsc::Sender<Event>,
    handlers: Arc<DashMap<EventKind, Vec<Handler>>>,
}

impl BusHandle {
    /// Register a handler for a signal kind.
    ///
    /// Handlers registered after spawn still receive subsequent events;
    /// the registry is shared with the dispatcher.
    pub fn register(&self, kind: EventKind, handler: Handler) {
        self.handlers.entry(kind).or_default().push(handler);
        debug!(kind = %kind, "bus handler registered");
    }

    /// Put an event on the bus, fire-and-forget.
    ///
    /// A full or closed channel drops the event with a warning; producers
    /// never block and never see an error.
    pub fn put(&self, event: Event) {
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(event)) => {
                warn!(kind = %event.kind, "bus channel full, event dropped");
            }
            Err(mpsc::error::TrySendError::Closed(event)) => {
                warn!(kind = %event.kind, "bus channel closed, event dropped");
            }
        }
    }

    /// Number of handlers registered for a kind.
    #[must_use]
    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.handlers.get(&kind).map_or(0, |entry| entry.len())
    }
}

/// The event bus dispatcher.
pub struct EventBus;

impl EventBus {
    /// Spawn the dispatcher task.
    ///
    /// Returns a [`BusHandle`] for producers and the dispatcher's join
    /// handle. The dispatcher exits when every handle clone is dropped.
    #[must_use]
    pub fn spawn(capacity: usize) -> (BusHandle, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<Event>(capacity);
        let handlers: Arc<DashMap<EventKind, Vec<Handler>>> = Arc::new(DashMap::new());
        let registry = handlers.clone();

        let join = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                dispatch(&registry, &event);
            }
            debug!("bus dispatcher stopped");
        });

        (BusHandle { tx, handlers }, join)
    }
}

/// Invoke every handler registered for the event's kind, in registration
/// order. A panicking handler is contained and logged; the remaining
/// handlers still run.
fn dispatch(registry: &DashMap<EventKind, Vec<Handler>>, event: &Event) {
    // Snapshot the handler list and release the shard lock before
    // invoking anything: a handler may itself call `register` for the
    // same kind.
    let handlers: Vec<Handler> = match registry.get(&event.kind) {
        Some(entry) => entry.value().clone(),
        None => {
            trace!(kind = %event.kind, "no handlers for event");
            return;
        }
    };

    for handler in &handlers {
        if catch_unwind(AssertUnwindSafe(|| handler(event))).is_err() {
            warn!(kind = %event.kind, "bus handler panicked");
        }
    }
}
