//! Session window classification.
//!
//! Futures venues trade in two daily windows: a day session and a night
//! session that crosses midnight. The classifier answers "is this instant
//! inside an active session" from the time-of-day alone; calendar concerns
//! (holidays, weekends) are handled separately by [`crate::TradingCalendar`].

use chrono::{DateTime, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// A time-of-day range, inclusive at both ends.
///
/// When `start > end` the window wraps past midnight and is interpreted as
/// the disjunction `t >= start || t <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Inclusive start time-of-day.
    pub start: NaiveTime,
    /// Inclusive end time-of-day.
    pub end: NaiveTime,
}

impl TimeWindow {
    /// Create a new window. `start > end` means the window wraps midnight.
    #[must_use]
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Check whether a time-of-day lies inside this window.
    ///
    /// Both boundaries are inclusive.
    #[must_use]
    pub fn contains(&self, time: NaiveTime) -> bool {
        if self.start <= self.end {
            time >= self.start && time <= self.end
        } else {
            // Wraps midnight, e.g. 20:45-02:35
            time >= self.start || time <= self.end
        }
    }

    /// Whether this window crosses midnight.
    #[must_use]
    pub fn wraps(&self) -> bool {
        self.start > self.end
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}-{}",
            self.start.format("%H:%M"),
            self.end.format("%H:%M")
        )
    }
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).expect("valid HH:MM literal")
}

/// Day session window: 08:45-15:05.
#[must_use]
pub fn day_session() -> TimeWindow {
    TimeWindow::new(hm(8, 45), hm(15, 5))
}

/// Night session window: 20:45-02:35, wrapping past midnight.
#[must_use]
pub fn night_session() -> TimeWindow {
    TimeWindow::new(hm(20, 45), hm(2, 35))
}

/// Check whether an instant falls inside an active trading session.
///
/// Returns `true` if the instant's time-of-day lies in the day session
/// (08:45-15:05) or the night session (>= 20:45 or <= 02:35). All four
/// boundaries are inclusive.
///
/// Pure function over the time-of-day; no shared state.
#[must_use]
pub fn is_active_session(instant: NaiveDateTime) -> bool {
    let time = instant.time();
    day_session().contains(time) || night_session().contains(time)
}

/// Classify a raw epoch-millisecond timestamp.
///
/// Fails with [`CoreError::InvalidTimestamp`] when the value cannot be
/// reduced to a calendar date and time-of-day (out of chrono's
/// representable range). The instant is interpreted in UTC.
pub fn is_active_session_ms(timestamp_ms: i64) -> Result<bool> {
    let instant = DateTime::from_timestamp_millis(timestamp_ms)
        .ok_or(CoreError::InvalidTimestamp(timestamp_ms))?;
    Ok(is_active_session(instant.naive_utc()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        // 2024-01-02 is a Tuesday
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn test_day_session_boundaries_inclusive() {
        assert!(is_active_session(at(8, 45)));
        assert!(is_active_session(at(15, 5)));
        assert!(!is_active_session(at(8, 44)));
        assert!(!is_active_session(at(15, 6)));
    }

    #[test]
    fn test_day_session_interior() {
        assert!(is_active_session(at(9, 0)));
        assert!(is_active_session(at(12, 30)));
        assert!(is_active_session(at(14, 59)));
    }

    #[test]
    fn test_night_session_boundaries_inclusive() {
        assert!(is_active_session(at(20, 45)));
        assert!(is_active_session(at(2, 35)));
        assert!(!is_active_session(at(20, 44)));
        assert!(!is_active_session(at(2, 36)));
    }

    #[test]
    fn test_night_session_wraps_midnight() {
        assert!(is_active_session(at(23, 0)));
        assert!(is_active_session(at(0, 30)));
        assert!(is_active_session(at(1, 59)));
    }

    #[test]
    fn test_gaps_between_sessions() {
        // Morning gap between night close and day open
        assert!(!is_active_session(at(3, 0)));
        assert!(!is_active_session(at(7, 0)));
        // Evening gap between day close and night open
        assert!(!is_active_session(at(16, 0)));
        assert!(!is_active_session(at(19, 30)));
    }

    #[test]
    fn test_window_contains_non_wrapping() {
        let window = day_session();
        assert!(!window.wraps());
        assert!(window.contains(hm(10, 0)));
        assert!(!window.contains(hm(16, 0)));
    }

    #[test]
    fn test_window_contains_wrapping() {
        let window = night_session();
        assert!(window.wraps());
        assert!(window.contains(hm(21, 0)));
        assert!(window.contains(hm(1, 0)));
        assert!(!window.contains(hm(12, 0)));
    }

    #[test]
    fn test_ms_classifier_valid() {
        // 2024-01-02T09:00:00Z
        let ts = at(9, 0).and_utc().timestamp_millis();
        assert_eq!(is_active_session_ms(ts), Ok(true));

        let ts = at(16, 0).and_utc().timestamp_millis();
        assert_eq!(is_active_session_ms(ts), Ok(false));
    }

    #[test]
    fn test_ms_classifier_invalid_timestamp() {
        let result = is_active_session_ms(i64::MAX);
        assert_eq!(result, Err(CoreError::InvalidTimestamp(i64::MAX)));
    }

    #[test]
    fn test_window_display() {
        assert_eq!(day_session().to_string(), "08:45-15:05");
        assert_eq!(night_session().to_string(), "20:45-02:35");
    }
}
