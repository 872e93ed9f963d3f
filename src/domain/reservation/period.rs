//! Booking period: a calendar date range with the half-open overlap rule

use chrono::{DateTime, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::shared::errors::{DomainError, DomainResult};

/// `[start, end)` in calendar days. `start == end` is a same-day booking
/// that still occupies (and bills) its start day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl BookingPeriod {
    pub fn new(start: NaiveDate, end: NaiveDate) -> DomainResult<Self> {
        if start > end {
            return Err(DomainError::InvalidRange(format!(
                "start {} is after end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse both ends; accepts `YYYY-MM-DD` or an RFC 3339 timestamp.
    pub fn parse(start: &str, end: &str) -> DomainResult<Self> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    /// Billable days: whole days between the dates, at least one.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days().max(1)
    }

    fn occupied_end(&self) -> NaiveDate {
        if self.end == self.start {
            self.start + Duration::days(1)
        } else {
            self.end
        }
    }

    /// Half-open overlap: `a.start < b.end && a.end > b.start`.
    ///
    /// A same-day booking is billed one day and holds that day, so it is
    /// tested as `[start, start + 1)`. A booking picking up on that day
    /// conflicts with it even though the bare date pair would not.
    pub fn overlaps(&self, other: &BookingPeriod) -> bool {
        self.start < other.occupied_end() && self.occupied_end() > other.start
    }
}

pub fn parse_date(raw: &str) -> DomainResult<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(DomainError::InvalidRange("date is required".to_string()));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .map_err(|_| DomainError::InvalidRange(format!("unparseable date '{}'", raw)))
}
