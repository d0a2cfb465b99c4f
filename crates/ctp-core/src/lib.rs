//! Core domain types for the ctp-sentinel session scheduler.
//!
//! This crate provides the fundamental types shared across the system:
//! - `TimeWindow`: a time-of-day range that may wrap past midnight
//! - Session classification (`is_active_session`)
//! - `TradingCalendar`: holiday/weekend/trading-day queries
//! - `Event` / `EventKind`: the bus message model
//! - `Clock`: injectable time source

pub mod calendar;
pub mod clock;
pub mod error;
pub mod event;
pub mod window;

pub use calendar::{HolidayCalendar, TradingCalendar};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CoreError, Result};
pub use event::{Event, EventKind};
pub use window::{day_session, is_active_session, is_active_session_ms, night_session, TimeWindow};
