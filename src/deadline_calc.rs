//! Per-regulation deadline calculators.
//!
//! One pure function per deadline. A missing required upstream date means
//! "cannot compute" (`None`), never an implicit zero-date. None of these
//! clamp or silently adjust — cross-field conflicts (e.g. a filing window
//! opening after PWD expiration) are the validators' and enforcement
//! policy's business.

use chrono::{Datelike, NaiveDate};

use crate::dates::add_days;

/// Days after the latest recruitment end before ETA-9089 may be filed
/// (the mandatory quiet period).
pub const FILING_WINDOW_OPEN_DAYS: i64 = 30;

/// Days after the latest recruitment end until the filing window closes.
pub const FILING_WINDOW_CLOSE_DAYS: i64 = 180;

/// Days after the earliest recruitment step until that step goes stale.
pub const RECRUITMENT_VALIDITY_DAYS: i64 = 180;

/// Validity of a spring-window PWD determination.
pub const PWD_SPRING_VALIDITY_DAYS: i64 = 90;

/// Days after ETA-9089 certification within which I-140 must be filed;
/// also the certification's own validity.
pub const CERTIFICATION_VALIDITY_DAYS: i64 = 180;

/// Fixed DOL response window for an RFI. No extensions.
pub const RFI_RESPONSE_DAYS: i64 = 30;

/// Default USCIS response window for an RFE. USCIS may grant a non-standard
/// window, so entries carry an optional per-entry override. The statutory
/// default should be confirmed out-of-band; it is deliberately one constant.
pub const DEFAULT_RFE_RESPONSE_DAYS: i64 = 87;

/// Spring-window test for PWD determinations: April 2 through June 30,
/// boundaries inclusive.
fn in_spring_window(date: NaiveDate) -> bool {
    match date.month() {
        4 => date.day() >= 2,
        5 | 6 => true,
        _ => false,
    }
}

/// PWD expiration. Determinations issued in the spring window carry a fixed
/// 90-day validity; all others expire June 30 of the following calendar year.
pub fn pwd_expiration(determination_date: Option<NaiveDate>) -> Option<NaiveDate> {
    let determination = determination_date?;
    if in_spring_window(determination) {
        Some(add_days(determination, PWD_SPRING_VALIDITY_DAYS))
    } else {
        NaiveDate::from_ymd_opt(determination.year() + 1, 6, 30)
    }
}

/// ETA-9089 filing window opens 30 days after the latest recruitment end.
pub fn filing_window_opens(recruitment_end: Option<NaiveDate>) -> Option<NaiveDate> {
    recruitment_end.map(|end| add_days(end, FILING_WINDOW_OPEN_DAYS))
}

/// ETA-9089 filing window closes 180 days after the latest recruitment end.
pub fn filing_window_closes(recruitment_end: Option<NaiveDate>) -> Option<NaiveDate> {
    recruitment_end.map(|end| add_days(end, FILING_WINDOW_CLOSE_DAYS))
}

/// The recruitment window closes 180 days after the earliest recruitment
/// step — past that, the oldest step is stale and filing is off the table.
pub fn recruitment_window_closes(recruitment_start: Option<NaiveDate>) -> Option<NaiveDate> {
    recruitment_start.map(|start| add_days(start, RECRUITMENT_VALIDITY_DAYS))
}

/// I-140 must be filed within 180 days of ETA-9089 certification.
pub fn i140_filing_deadline(certification_date: Option<NaiveDate>) -> Option<NaiveDate> {
    certification_date.map(|cert| add_days(cert, CERTIFICATION_VALIDITY_DAYS))
}

/// Default ETA-9089 certification expiration (the same 180-day validity).
pub fn eta9089_expiration(certification_date: Option<NaiveDate>) -> Option<NaiveDate> {
    certification_date.map(|cert| add_days(cert, CERTIFICATION_VALIDITY_DAYS))
}

/// RFI response due date: received + the fixed statutory window.
pub fn rfi_response_due(received_date: NaiveDate) -> NaiveDate {
    add_days(received_date, RFI_RESPONSE_DAYS)
}

/// RFE response due date: received + the per-entry window when USCIS granted
/// a non-standard one, otherwise the default.
pub fn rfe_response_due(received_date: NaiveDate, window_days: Option<i64>) -> NaiveDate {
    add_days(received_date, window_days.unwrap_or(DEFAULT_RFE_RESPONSE_DAYS))
}
