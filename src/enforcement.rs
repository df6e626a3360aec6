//! Enforcement and closure policy.
//!
//! Decides whether a case has irrecoverably missed a regulatory deadline
//! (suggest close) or is merely approaching one (warn), and produces the
//! plain-language notification copy for either. The core only decides
//! whether and why — the login-time enforcement sweep applies the close and
//! writes the notification, and only when the user has enforcement enabled.
//! Detection itself works regardless of that toggle.

use chrono::NaiveDate;

use crate::cascade::recalculate_derived_dates;
use crate::dates::days_between;
use crate::deadline_calc;
use crate::types::{CaseFields, CaseStatus, NotificationCopy, SuggestedAction, Violation};

/// Days of remaining runway below which a warning fires.
pub const WARNING_WINDOW_DAYS: i64 = 30;

pub mod rule_ids {
    pub const CERTIFICATION_EXPIRED: &str = "enforcement.certification_expired";
    pub const FILING_WINDOW_MISSED: &str = "enforcement.filing_window_missed";
    pub const RECRUITMENT_WINDOW_MISSED: &str = "enforcement.recruitment_window_missed";
    pub const PWD_EXPIRED: &str = "enforcement.pwd_expired";

    pub const CERTIFICATION_EXPIRING: &str = "enforcement.certification_expiring";
    pub const FILING_WINDOW_CLOSING: &str = "enforcement.filing_window_closing";
    pub const RECRUITMENT_WINDOW_CLOSING: &str = "enforcement.recruitment_window_closing";
    pub const PWD_EXPIRING: &str = "enforcement.pwd_expiring";
}

/// Check a case for missed or imminent regulatory deadlines. Returns the
/// single most severe finding: closures before warnings, later-stage rules
/// before earlier ones. `None` is the expected steady state.
pub fn check_deadline_violations(fields: &CaseFields, today: NaiveDate) -> Option<Violation> {
    if fields.case_status == CaseStatus::Closed || fields.i140_approval_date.is_some() {
        return None;
    }

    let derived = recalculate_derived_dates(fields);
    let eta9089_filed = fields.eta9089_filing_date.is_some();
    let i140_filed = fields.i140_filing_date.is_some() || fields.i140_receipt_date.is_some();

    let pwd_expiration = fields
        .pwd_expiration_date
        .or_else(|| deadline_calc::pwd_expiration(fields.pwd_determination_date));
    let certification_expiration = fields
        .eta9089_expiration_date
        .or_else(|| deadline_calc::eta9089_expiration(fields.eta9089_certification_date));

    // Hard closures, most advanced stage first.
    if !i140_filed {
        if let Some(expiration) = certification_expiration {
            if expiration < today {
                return Some(violation(
                    rule_ids::CERTIFICATION_EXPIRED,
                    "eta9089ExpirationDate",
                    format!(
                        "ETA-9089 certification expired {} with no I-140 filed",
                        expiration
                    ),
                    SuggestedAction::Close,
                ));
            }
        }
    }
    if !eta9089_filed {
        if let Some(closes) = derived.filing_window_closes {
            if closes < today {
                return Some(violation(
                    rule_ids::FILING_WINDOW_MISSED,
                    "filingWindowCloses",
                    format!("ETA-9089 filing window closed {} with no filing", closes),
                    SuggestedAction::Close,
                ));
            }
        }
        if let Some(closes) = derived.recruitment_window_closes {
            if closes < today {
                return Some(violation(
                    rule_ids::RECRUITMENT_WINDOW_MISSED,
                    "recruitmentWindowCloses",
                    format!("Recruitment went stale {} with no ETA-9089 filed", closes),
                    SuggestedAction::Close,
                ));
            }
        }
        if let Some(expiration) = pwd_expiration {
            if expiration < today {
                return Some(violation(
                    rule_ids::PWD_EXPIRED,
                    "pwdExpirationDate",
                    format!("PWD expired {} with no ETA-9089 filed", expiration),
                    SuggestedAction::Close,
                ));
            }
        }
    }

    // Warnings for the approaching versions of the same deadlines.
    if !i140_filed {
        if let Some(expiration) = certification_expiration {
            let remaining = days_between(today, expiration);
            if remaining <= WARNING_WINDOW_DAYS {
                return Some(violation(
                    rule_ids::CERTIFICATION_EXPIRING,
                    "eta9089ExpirationDate",
                    format!(
                        "ETA-9089 certification expires {} ({} days); I-140 not yet filed",
                        expiration, remaining
                    ),
                    SuggestedAction::Warn,
                ));
            }
        }
    }
    if !eta9089_filed {
        if let Some(closes) = derived.filing_window_closes {
            let remaining = days_between(today, closes);
            if remaining <= WARNING_WINDOW_DAYS {
                return Some(violation(
                    rule_ids::FILING_WINDOW_CLOSING,
                    "filingWindowCloses",
                    format!(
                        "ETA-9089 filing window closes {} ({} days)",
                        closes, remaining
                    ),
                    SuggestedAction::Warn,
                ));
            }
        }
        if let Some(closes) = derived.recruitment_window_closes {
            let remaining = days_between(today, closes);
            if remaining <= WARNING_WINDOW_DAYS {
                return Some(violation(
                    rule_ids::RECRUITMENT_WINDOW_CLOSING,
                    "recruitmentWindowCloses",
                    format!("Recruitment goes stale {} ({} days)", closes, remaining),
                    SuggestedAction::Warn,
                ));
            }
        }
        if let Some(expiration) = pwd_expiration {
            let remaining = days_between(today, expiration);
            if remaining <= WARNING_WINDOW_DAYS {
                return Some(violation(
                    rule_ids::PWD_EXPIRING,
                    "pwdExpirationDate",
                    format!("PWD expires {} ({} days)", expiration, remaining),
                    SuggestedAction::Warn,
                ));
            }
        }
    }

    None
}

/// Notification copy for an enforcement finding. Displayed verbatim.
pub fn notification_copy(fields: &CaseFields, violation: &Violation) -> NotificationCopy {
    let title = match violation.suggested_action {
        SuggestedAction::Close => format!("Case closed: {}", fields.employer_name),
        SuggestedAction::Warn => format!("Deadline approaching: {}", fields.employer_name),
    };
    let message = format!(
        "{} ({}): {}",
        fields.employer_name, fields.beneficiary_identifier, violation.message
    );
    NotificationCopy { title, message }
}

fn violation(
    rule_id: &str,
    field: &str,
    message: String,
    suggested_action: SuggestedAction,
) -> Violation {
    Violation {
        rule_id: rule_id.to_string(),
        field: field.to_string(),
        message,
        suggested_action,
    }
}
