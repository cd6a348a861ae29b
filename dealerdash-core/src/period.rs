//! Reporting periods for the dashboard's period filter

use std::fmt;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{DashError, Result};
use crate::format::format_date;

/// Which sales the dashboard listing covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    /// No date filter; the listing falls back to the most recent sales
    #[default]
    All,
    Last30Days,
    Last90Days,
    /// The last 365 days
    LastYear,
    /// Whole calendar days, both ends inclusive
    Custom { start: NaiveDate, end: NaiveDate },
}

impl Period {
    /// Custom period; `start` must not be after `end`.
    pub fn custom(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(DashError::invalid_period(format!(
                "start {start} is after end {end}"
            )));
        }
        Ok(Self::Custom { start, end })
    }

    /// Concrete `[start, end]` bounds relative to `now`, or `None` for
    /// [`Period::All`].
    pub fn resolve(&self, now: NaiveDateTime) -> Option<(NaiveDateTime, NaiveDateTime)> {
        match *self {
            Period::All => None,
            Period::Last30Days => Some((now - Duration::days(30), now)),
            Period::Last90Days => Some((now - Duration::days(90), now)),
            Period::LastYear => Some((now - Duration::days(365), now)),
            Period::Custom { start, end } => Some((start_of_day(start), end_of_day(end))),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::All => f.write_str("all data"),
            Period::Last30Days => f.write_str("last 30 days"),
            Period::Last90Days => f.write_str("last 90 days"),
            Period::LastYear => f.write_str("last year"),
            Period::Custom { start, end } => {
                write!(f, "{} to {}", format_date(*start), format_date(*end))
            }
        }
    }
}

/// 00:00:00 on `day`
pub fn start_of_day(day: NaiveDate) -> NaiveDateTime {
    day.and_time(NaiveTime::MIN)
}

/// The last representable microsecond of `day`
pub fn end_of_day(day: NaiveDate) -> NaiveDateTime {
    start_of_day(day) + Duration::days(1) - Duration::microseconds(1)
}
