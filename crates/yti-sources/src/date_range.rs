//! Date arguments for Toggl API pulls and tracker reports.
//!
//! Arguments accept an ISO date (`2014-10-06`) or a named range:
//! `yesterday`, `today`, `this-week`, `last-week`. "Yesterday" is
//! workday-aware: on a Monday it means the previous Friday.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use thiserror::Error;

/// An inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub since: NaiveDate,
    pub until: NaiveDate,
}

/// Errors parsing a date argument.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DateRangeError {
    /// Neither an ISO date nor a known named range.
    #[error("cannot parse date argument {value:?}; use YYYY-MM-DD or one of \
             yesterday, today, this-week, last-week")]
    Unrecognized { value: String },
}

/// The most recent workday before `today` (Friday when `today` is Monday).
fn yesterday(today: NaiveDate) -> NaiveDate {
    let days_back = if today.weekday() == Weekday::Mon { 3 } else { 1 };
    today - Days::new(days_back)
}

/// The Monday of the week containing `today`.
fn monday(today: NaiveDate) -> NaiveDate {
    today - Days::new(u64::from(today.weekday().num_days_from_monday()))
}

/// Resolves a named range relative to `today`.
pub fn named_range(name: &str, today: NaiveDate) -> Option<DateRange> {
    let monday = monday(today);
    match name {
        "yesterday" => {
            let day = yesterday(today);
            Some(DateRange {
                since: day,
                until: day,
            })
        }
        "today" => Some(DateRange {
            since: today,
            until: today,
        }),
        "this-week" => Some(DateRange {
            since: monday,
            until: today,
        }),
        "last-week" => Some(DateRange {
            since: monday - Days::new(7),
            until: monday - Days::new(3),
        }),
        _ => None,
    }
}

/// Resolves a `--since` argument: an ISO date, or the start of a named range.
pub fn resolve_since(value: &str, today: NaiveDate) -> Result<NaiveDate, DateRangeError> {
    resolve(value, today).map(|range| range.since)
}

/// Resolves an `--until` argument: an ISO date, or the end of a named range.
pub fn resolve_until(value: &str, today: NaiveDate) -> Result<NaiveDate, DateRangeError> {
    resolve(value, today).map(|range| range.until)
}

fn resolve(value: &str, today: NaiveDate) -> Result<DateRange, DateRangeError> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(DateRange {
            since: date,
            until: date,
        });
    }
    named_range(value, today).ok_or_else(|| DateRangeError::Unrecognized {
        value: value.to_string(),
    })
}
