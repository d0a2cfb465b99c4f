//! Risk-gated action dispatch.
//!
//! A [`RiskGate`] wraps one trading action in a before/after check
//! envelope: the pre-check can veto execution (logged, not an error),
//! the post-check records risk bookkeeping after the action runs. A
//! shared [`RiskContext`] carries the event-bus handle (attached exactly
//! once) and subscribes the process-wide [`RealtimeCheck`] to the bus's
//! timer signal.

pub mod category;
pub mod context;
pub mod error;
pub mod gate;

pub use category::{ConnectionStatus, RiskCategory};
pub use context::{NoopRealtimeCheck, RealtimeCheck, RiskContext};
pub use error::{RiskError, RiskResult};
pub use gate::{RiskGate, RiskGateBuilder};
