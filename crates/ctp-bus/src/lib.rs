//! Event bus for ctp-sentinel.
//!
//! Producers `put` events without waiting for delivery; a dispatcher task
//! owns ordering and invokes every handler registered for the event's
//! kind. A timer task feeds periodic `Timer` events into the same channel.

pub mod bus;
pub mod timer;

pub use bus::{BusHandle, EventBus, Handler};
pub use timer::run_timer;
