//! Session scheduling for ctp-sentinel.
//!
//! Two independent cooperative loops share the calendar/classifier logic:
//! - [`SessionScheduler`] transitions host extensions in and out of
//!   service on session edges (hysteresis: only edges act).
//! - [`PeriodicQueryLoop`] issues position/account refresh queries while
//!   the session is live.

pub mod query_loop;
pub mod scheduler;

pub use query_loop::PeriodicQueryLoop;
pub use scheduler::{plan_transition, SessionScheduler, SessionState, SweepAction};
