//! Application configuration.

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use ctp_core::HolidayCalendar;

/// Application configuration, loaded from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Session scheduler tick (seconds). Default: 1.
    #[serde(default = "default_scheduler_tick_secs")]
    pub scheduler_tick_secs: u64,

    /// Query loop gating tick (seconds). Default: 1.
    #[serde(default = "default_query_tick_secs")]
    pub query_tick_secs: u64,

    /// Spacing between the position and account queries (seconds).
    /// Read through the host at the moment of use, so runtime updates
    /// apply on the next cycle. Default: 5.
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    /// Bus timer signal interval (seconds). Default: 1.
    #[serde(default = "default_timer_interval_secs")]
    pub timer_interval_secs: u64,

    /// Bus channel capacity. Default: 256.
    #[serde(default = "default_bus_capacity")]
    pub bus_capacity: usize,

    /// Exchange holiday table (ISO dates). Weekend handling needs no
    /// configuration.
    #[serde(default)]
    pub holidays: Vec<NaiveDate>,

    /// Extensions known to the host at startup.
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Label attached to startup/shutdown logs, useful when several
    /// instances share a log pipeline.
    #[serde(default = "default_label")]
    pub label: String,
}

fn default_scheduler_tick_secs() -> u64 {
    1
}

fn default_query_tick_secs() -> u64 {
    1
}

fn default_refresh_interval_secs() -> u64 {
    5
}

fn default_timer_interval_secs() -> u64 {
    1
}

fn default_bus_capacity() -> usize {
    256
}

fn default_label() -> String {
    "ctp-sentinel".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scheduler_tick_secs: default_scheduler_tick_secs(),
            query_tick_secs: default_query_tick_secs(),
            refresh_interval_secs: default_refresh_interval_secs(),
            timer_interval_secs: default_timer_interval_secs(),
            bus_capacity: default_bus_capacity(),
            holidays: Vec::new(),
            extensions: Vec::new(),
            label: default_label(),
        }
    }
}

impl AppConfig {
    /// Load configuration, falling back to defaults when no file exists.
    pub fn load() -> AppResult<Self> {
        let config_path =
            std::env::var("CTP_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());

        if Path::new(&config_path).exists() {
            Self::from_file(&config_path)
        } else {
            tracing::warn!(path = %config_path, "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("failed to read config: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("failed to parse config: {e}")))
    }

    /// Build the trading calendar from the holiday table.
    #[must_use]
    pub fn calendar(&self) -> HolidayCalendar {
        HolidayCalendar::from_dates(self.holidays.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctp_core::TradingCalendar;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.scheduler_tick_secs, 1);
        assert_eq!(config.query_tick_secs, 1);
        assert_eq!(config.refresh_interval_secs, 5);
        assert_eq!(config.bus_capacity, 256);
        assert!(config.holidays.is_empty());
        assert!(config.extensions.is_empty());
        assert_eq!(config.label, "ctp-sentinel");
    }

    #[test]
    fn test_full_toml_parses() {
        let config: AppConfig = toml::from_str(
            r#"
            scheduler_tick_secs = 2
            refresh_interval_secs = 10
            holidays = ["2024-01-01", "2024-02-12"]
            extensions = ["recorder", "strategy"]
            "#,
        )
        .unwrap();

        assert_eq!(config.scheduler_tick_secs, 2);
        assert_eq!(config.refresh_interval_secs, 10);
        assert_eq!(config.holidays.len(), 2);
        assert_eq!(config.extensions, ["recorder", "strategy"]);
    }

    #[test]
    fn test_calendar_from_holidays() {
        let config: AppConfig = toml::from_str(r#"holidays = ["2024-01-01"]"#).unwrap();
        let calendar = config.calendar();
        let new_year = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(calendar.is_holiday(new_year));
        assert!(!calendar.is_trading_day(new_year));
    }
}
