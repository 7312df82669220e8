//! Inclusive calendar-date window used for both fetching and reconciling.

use chrono::{Days, NaiveDate, NaiveTime};

use crate::datetime::Normalizer;
use crate::error::{SyncError, SyncResult};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Default length of the recurring fetch window.
pub const DEFAULT_WINDOW_DAYS: u64 = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl CalendarWindow {
    /// Parse a window from two YYYY-MM-DD strings.
    pub fn parse(start: &str, end: &str) -> SyncResult<Self> {
        let invalid = || SyncError::InvalidWindow {
            start: start.to_string(),
            end: end.to_string(),
        };

        let start_date = NaiveDate::parse_from_str(start.trim(), DATE_FORMAT).map_err(|_| invalid())?;
        let end_date = NaiveDate::parse_from_str(end.trim(), DATE_FORMAT).map_err(|_| invalid())?;

        Ok(CalendarWindow {
            start: start_date,
            end: end_date,
        })
    }

    /// `today` through `today + days`.
    pub fn upcoming(today: NaiveDate, days: u64) -> SyncResult<Self> {
        let end = today
            .checked_add_days(Days::new(days))
            .ok_or_else(|| SyncError::Config(format!("Window of {days} days is out of range")))?;

        Ok(CalendarWindow { start: today, end })
    }

    pub fn start_str(&self) -> String {
        self.start.format(DATE_FORMAT).to_string()
    }

    pub fn end_str(&self) -> String {
        self.end.format(DATE_FORMAT).to_string()
    }

    /// Start of the first day, RFC 3339 in the normalizer's zone.
    pub fn time_min(&self, normalizer: &Normalizer) -> SyncResult<String> {
        let dt = normalizer.localize(self.start.and_time(NaiveTime::MIN));
        Ok(dt.to_rfc3339())
    }

    /// 23:59:59 on the last day, RFC 3339 in the normalizer's zone.
    pub fn time_max(&self, normalizer: &Normalizer) -> SyncResult<String> {
        let end_of_day = NaiveTime::from_hms_opt(23, 59, 59)
            .ok_or_else(|| SyncError::InvalidTime("23:59:59".to_string()))?;
        let dt = normalizer.localize(self.end.and_time(end_of_day));
        Ok(dt.to_rfc3339())
    }
}
