//! Trading calendar queries.
//!
//! The calendar answers holiday/weekend/trading-day questions for a given
//! date. Holiday computation itself is supplied externally (a date table
//! from configuration); this crate only evaluates membership.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate, Weekday};

/// Calendar collaborator consumed by the scheduler and query loop.
pub trait TradingCalendar: Send + Sync {
    /// Whether the date is an exchange holiday.
    fn is_holiday(&self, date: NaiveDate) -> bool;

    /// Whether the date falls on a weekend.
    fn is_weekend(&self, date: NaiveDate) -> bool {
        matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
    }

    /// A trading day is neither a holiday nor a weekend.
    fn is_trading_day(&self, date: NaiveDate) -> bool {
        !self.is_holiday(date) && !self.is_weekend(date)
    }
}

/// Calendar backed by an explicit holiday table.
#[derive(Debug, Clone, Default)]
pub struct HolidayCalendar {
    holidays: HashSet<NaiveDate>,
}

impl HolidayCalendar {
    /// Create a calendar with no holidays (weekends still apply).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a calendar from a holiday date table.
    pub fn from_dates<I: IntoIterator<Item = NaiveDate>>(dates: I) -> Self {
        Self {
            holidays: dates.into_iter().collect(),
        }
    }

    /// Number of holidays in the table.
    #[must_use]
    pub fn holiday_count(&self) -> usize {
        self.holidays.len()
    }
}

impl TradingCalendar for HolidayCalendar {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(&date)
    }
}
