//! Calendar-date helpers.
//!
//! All case dates are timezone-free calendar dates in `YYYY-MM-DD` form.
//! "Today" is always supplied by the caller — nothing in the core reads a
//! system clock, so every computation is deterministic and replayable.

use chrono::{Duration, NaiveDate};

use crate::error::CaseError;

pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` string, failing fast on anything malformed.
pub fn parse_iso_date(value: &str) -> Result<NaiveDate, CaseError> {
    NaiveDate::parse_from_str(value, ISO_DATE_FORMAT)
        .map_err(|_| CaseError::InvalidDate(value.to_string()))
}

/// Format a date back to `YYYY-MM-DD`.
pub fn format_iso_date(date: NaiveDate) -> String {
    date.format(ISO_DATE_FORMAT).to_string()
}

/// Calendar-day offset. Saturating is unnecessary — case dates live
/// centuries away from `NaiveDate`'s representable range.
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    date + Duration::days(days)
}

/// Signed whole days from `from` to `to` (negative when `to` is earlier).
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Earliest of the dates that are present, or `None` if none are.
pub fn earliest(candidates: &[Option<NaiveDate>]) -> Option<NaiveDate> {
    candidates.iter().flatten().min().copied()
}

/// Latest of the dates that are present, or `None` if none are.
pub fn latest(candidates: &[Option<NaiveDate>]) -> Option<NaiveDate> {
    candidates.iter().flatten().max().copied()
}
