//! US federal holiday and business-day arithmetic.
//!
//! Leaf utility for every deadline calculator and the notice-of-filing
//! posting rule (10 consecutive business days). Holidays are returned on
//! their *observed* day: a fixed-date holiday falling on Saturday is
//! observed the preceding Friday, on Sunday the following Monday.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Observed US federal holidays for a year, in calendar order.
pub fn federal_holidays(year: i32) -> Vec<NaiveDate> {
    let mut holidays = vec![
        observed(fixed(year, 1, 1)),                  // New Year's Day
        nth_weekday(year, 1, Weekday::Mon, 3),        // Birthday of Martin Luther King, Jr.
        nth_weekday(year, 2, Weekday::Mon, 3),        // Washington's Birthday
        last_weekday(year, 5, Weekday::Mon),          // Memorial Day
    ];
    if year >= 2021 {
        holidays.push(observed(fixed(year, 6, 19))); // Juneteenth
    }
    holidays.extend([
        observed(fixed(year, 7, 4)),                  // Independence Day
        nth_weekday(year, 9, Weekday::Mon, 1),        // Labor Day
        nth_weekday(year, 10, Weekday::Mon, 2),       // Columbus Day
        observed(fixed(year, 11, 11)),                // Veterans Day
        nth_weekday(year, 11, Weekday::Thu, 4),       // Thanksgiving Day
        observed(fixed(year, 12, 25)),                // Christmas Day
    ]);
    holidays.sort();
    holidays
}

/// Whether the date is an observed federal holiday.
pub fn is_federal_holiday(date: NaiveDate) -> bool {
    // New Year's observed on Dec 31 belongs to the *next* year's holiday set.
    federal_holidays(date.year()).contains(&date)
        || (date.month() == 12 && federal_holidays(date.year() + 1).first() == Some(&date))
}

/// Weekday and not an observed federal holiday.
pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !is_federal_holiday(date)
}

/// Offset by `n` business days (negative counts backward). Zero returns the
/// input unchanged, even on a weekend or holiday.
pub fn add_business_days(date: NaiveDate, n: i64) -> NaiveDate {
    let step = if n >= 0 { 1 } else { -1 };
    let mut remaining = n.abs();
    let mut current = date;
    while remaining > 0 {
        current += Duration::days(step);
        if is_business_day(current) {
            remaining -= 1;
        }
    }
    current
}

fn fixed(year: i32, month: u32, day: u32) -> NaiveDate {
    // Infallible: month/day pairs here are compile-time holiday constants.
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Shift a fixed-date holiday to its observed weekday.
fn observed(date: NaiveDate) -> NaiveDate {
    match date.weekday() {
        Weekday::Sat => date - Duration::days(1),
        Weekday::Sun => date + Duration::days(1),
        _ => date,
    }
}

/// The nth occurrence of `weekday` in the month (n is 1-based).
fn nth_weekday(year: i32, month: u32, weekday: Weekday, n: u32) -> NaiveDate {
    let first = fixed(year, month, 1);
    let offset = (7 + weekday.num_days_from_monday() - first.weekday().num_days_from_monday()) % 7;
    first + Duration::days(offset as i64 + 7 * (n as i64 - 1))
}

/// The last occurrence of `weekday` in the month.
fn last_weekday(year: i32, month: u32, weekday: Weekday) -> NaiveDate {
    let next_month = if month == 12 {
        fixed(year + 1, 1, 1)
    } else {
        fixed(year, month + 1, 1)
    };
    let last = next_month - Duration::days(1);
    let offset = (7 + last.weekday().num_days_from_monday() - weekday.num_days_from_monday()) % 7;
    last - Duration::days(offset as i64)
}
