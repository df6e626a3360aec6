//! Cross-field regulatory consistency rules.
//!
//! Each rule is an independent pure predicate over the merged case view.
//! All violated rules are collected — no short-circuit — so the caller can
//! report every problem at once. The reject-vs-warn decision is the
//! caller's: create/update reject on any violation, bulk import downgrades
//! to row warnings.

use chrono::{Datelike, NaiveDate, Weekday};

use crate::business_days::add_business_days;
use crate::cascade::recalculate_derived_dates;
use crate::dates::days_between;
use crate::deadline_calc::CERTIFICATION_VALIDITY_DAYS;
use crate::types::{CaseFields, ValidationError, ValidationResult};

/// Stable rule identifiers. Callers and tests assert on these, never on
/// message wording.
pub mod rule_ids {
    pub const PWD_DETERMINATION_AFTER_FILING: &str = "pwd.determination_after_filing";
    pub const PWD_EXPIRATION_AFTER_DETERMINATION: &str = "pwd.expiration_after_determination";

    pub const JOB_ORDER_ORDERED: &str = "recruitment.job_order_ordered";
    pub const JOB_ORDER_THIRTY_DAYS: &str = "recruitment.job_order_thirty_days";
    pub const SUNDAY_ADS_ORDERED: &str = "recruitment.sunday_ads_ordered";
    pub const SUNDAY_AD_ON_SUNDAY: &str = "recruitment.sunday_ad_on_sunday";
    pub const NOTICE_ORDERED: &str = "recruitment.notice_ordered";
    pub const NOTICE_TEN_BUSINESS_DAYS: &str = "recruitment.notice_ten_business_days";

    pub const ETA9089_FILED_AFTER_WINDOW_OPENS: &str = "eta9089.filed_after_window_opens";
    pub const ETA9089_FILED_BEFORE_WINDOW_CLOSES: &str = "eta9089.filed_before_window_closes";
    pub const ETA9089_FILED_BEFORE_PWD_EXPIRES: &str = "eta9089.filed_before_pwd_expires";
    pub const ETA9089_CERTIFICATION_AFTER_FILING: &str = "eta9089.certification_after_filing";
    pub const ETA9089_EXPIRATION_AFTER_CERTIFICATION: &str =
        "eta9089.expiration_after_certification";

    pub const I140_FILED_AFTER_CERTIFICATION: &str = "i140.filed_after_certification";
    pub const I140_FILED_WITHIN_DEADLINE: &str = "i140.filed_within_deadline";
    pub const I140_APPROVAL_AFTER_FILING: &str = "i140.approval_after_filing";
    pub const I140_DENIAL_AFTER_FILING: &str = "i140.denial_after_filing";
    pub const I140_OUTCOME_EXCLUSIVE: &str = "i140.outcome_exclusive";

    pub const RFI_RESPONSE_AFTER_RECEIVED: &str = "rfi.response_after_received";
    pub const RFI_DUE_AFTER_RECEIVED: &str = "rfi.due_after_received";
    pub const RFE_RESPONSE_AFTER_RECEIVED: &str = "rfe.response_after_received";
    pub const RFE_DUE_AFTER_RECEIVED: &str = "rfe.due_after_received";
    pub const RFE_WINDOW_POSITIVE: &str = "rfe.window_positive";

    pub const WINDOW_OPENS_BEFORE_PWD_EXPIRES: &str = "cross.window_opens_before_pwd_expires";
}

/// Run every rule over the merged case view. Derived dates are recomputed
/// here rather than read from the persisted cache, so validation never
/// trusts a stale value.
pub fn validate_case(fields: &CaseFields) -> ValidationResult {
    let derived = recalculate_derived_dates(fields);
    let mut errors = Vec::new();

    check_pwd(fields, &mut errors);
    check_recruitment(fields, &mut errors);
    check_eta9089(fields, &derived.filing_window_opens, &derived.filing_window_closes, &mut errors);
    check_i140(fields, &mut errors);
    check_rfi_rfe(fields, &mut errors);

    // Cross-phase: the filing window must open on or before PWD expiration.
    // A window that would open afterwards is a missed-window violation, not
    // a silently adjusted date.
    if let (Some(opens), Some(pwd_exp)) = (derived.filing_window_opens, fields.pwd_expiration_date)
    {
        if opens > pwd_exp {
            errors.push(err(
                rule_ids::WINDOW_OPENS_BEFORE_PWD_EXPIRES,
                "filingWindowOpens",
                format!(
                    "Filing window opens {} but the PWD expires {}",
                    opens, pwd_exp
                ),
            ));
        }
    }

    ValidationResult {
        valid: errors.is_empty(),
        errors,
    }
}

fn check_pwd(fields: &CaseFields, errors: &mut Vec<ValidationError>) {
    if let (Some(filing), Some(determination)) =
        (fields.pwd_filing_date, fields.pwd_determination_date)
    {
        if determination < filing {
            errors.push(err(
                rule_ids::PWD_DETERMINATION_AFTER_FILING,
                "pwdDeterminationDate",
                "PWD determination date precedes the PWD filing date".into(),
            ));
        }
    }
    if let (Some(determination), Some(expiration)) =
        (fields.pwd_determination_date, fields.pwd_expiration_date)
    {
        if expiration < determination {
            errors.push(err(
                rule_ids::PWD_EXPIRATION_AFTER_DETERMINATION,
                "pwdExpirationDate",
                "PWD expiration date precedes the determination date".into(),
            ));
        }
    }
}

fn check_recruitment(fields: &CaseFields, errors: &mut Vec<ValidationError>) {
    if let (Some(start), Some(end)) = (fields.job_order_start_date, fields.job_order_end_date) {
        if end < start {
            errors.push(err(
                rule_ids::JOB_ORDER_ORDERED,
                "jobOrderEndDate",
                "Job order end date precedes its start date".into(),
            ));
        } else if days_between(start, end) + 1 < 30 {
            errors.push(err(
                rule_ids::JOB_ORDER_THIRTY_DAYS,
                "jobOrderEndDate",
                "State workforce agency job order must run at least 30 days".into(),
            ));
        }
    }

    if let (Some(first), Some(second)) =
        (fields.sunday_ad_first_date, fields.sunday_ad_second_date)
    {
        if second < first {
            errors.push(err(
                rule_ids::SUNDAY_ADS_ORDERED,
                "sundayAdSecondDate",
                "Second Sunday ad runs before the first".into(),
            ));
        }
    }
    for (field, date) in [
        ("sundayAdFirstDate", fields.sunday_ad_first_date),
        ("sundayAdSecondDate", fields.sunday_ad_second_date),
    ] {
        if let Some(date) = date {
            if date.weekday() != Weekday::Sun {
                errors.push(err(
                    rule_ids::SUNDAY_AD_ON_SUNDAY,
                    field,
                    format!("{} is a {}, not a Sunday", date, date.weekday()),
                ));
            }
        }
    }

    if let (Some(start), Some(end)) = (
        fields.notice_of_filing_start_date,
        fields.notice_of_filing_end_date,
    ) {
        if end < start {
            errors.push(err(
                rule_ids::NOTICE_ORDERED,
                "noticeOfFilingEndDate",
                "Notice of filing end date precedes its start date".into(),
            ));
        } else if end < add_business_days(start, 9) {
            // Start counts as the first posted day, so the posting must span
            // through the 10th business day from start.
            errors.push(err(
                rule_ids::NOTICE_TEN_BUSINESS_DAYS,
                "noticeOfFilingEndDate",
                "Notice of filing must be posted for 10 consecutive business days".into(),
            ));
        }
    }
}

fn check_eta9089(
    fields: &CaseFields,
    window_opens: &Option<NaiveDate>,
    window_closes: &Option<NaiveDate>,
    errors: &mut Vec<ValidationError>,
) {
    if let Some(filing) = fields.eta9089_filing_date {
        if let Some(opens) = window_opens {
            if filing < *opens {
                errors.push(err(
                    rule_ids::ETA9089_FILED_AFTER_WINDOW_OPENS,
                    "eta9089FilingDate",
                    format!(
                        "ETA-9089 filed {} before the filing window opens {}",
                        filing, opens
                    ),
                ));
            }
        }
        if let Some(closes) = window_closes {
            if filing > *closes {
                errors.push(err(
                    rule_ids::ETA9089_FILED_BEFORE_WINDOW_CLOSES,
                    "eta9089FilingDate",
                    format!(
                        "ETA-9089 filed {} after the filing window closed {}",
                        filing, closes
                    ),
                ));
            }
        }
        if let Some(pwd_exp) = fields.pwd_expiration_date {
            if filing > pwd_exp {
                errors.push(err(
                    rule_ids::ETA9089_FILED_BEFORE_PWD_EXPIRES,
                    "eta9089FilingDate",
                    format!("ETA-9089 filed {} after the PWD expired {}", filing, pwd_exp),
                ));
            }
        }
        if let Some(cert) = fields.eta9089_certification_date {
            if cert < filing {
                errors.push(err(
                    rule_ids::ETA9089_CERTIFICATION_AFTER_FILING,
                    "eta9089CertificationDate",
                    "Certification date precedes the ETA-9089 filing date".into(),
                ));
            }
        }
    }
    if let (Some(cert), Some(expiration)) = (
        fields.eta9089_certification_date,
        fields.eta9089_expiration_date,
    ) {
        if expiration < cert {
            errors.push(err(
                rule_ids::ETA9089_EXPIRATION_AFTER_CERTIFICATION,
                "eta9089ExpirationDate",
                "ETA-9089 expiration precedes the certification date".into(),
            ));
        }
    }
}

fn check_i140(fields: &CaseFields, errors: &mut Vec<ValidationError>) {
    if let (Some(cert), Some(filing)) =
        (fields.eta9089_certification_date, fields.i140_filing_date)
    {
        if filing < cert {
            errors.push(err(
                rule_ids::I140_FILED_AFTER_CERTIFICATION,
                "i140FilingDate",
                "I-140 filed before the ETA-9089 was certified".into(),
            ));
        } else if days_between(cert, filing) > CERTIFICATION_VALIDITY_DAYS {
            errors.push(err(
                rule_ids::I140_FILED_WITHIN_DEADLINE,
                "i140FilingDate",
                "I-140 filed more than 180 days after certification".into(),
            ));
        }
    }
    if let (Some(filing), Some(approval)) = (fields.i140_filing_date, fields.i140_approval_date) {
        if approval < filing {
            errors.push(err(
                rule_ids::I140_APPROVAL_AFTER_FILING,
                "i140ApprovalDate",
                "I-140 approval precedes its filing date".into(),
            ));
        }
    }
    if let (Some(filing), Some(denial)) = (fields.i140_filing_date, fields.i140_denial_date) {
        if denial < filing {
            errors.push(err(
                rule_ids::I140_DENIAL_AFTER_FILING,
                "i140DenialDate",
                "I-140 denial precedes its filing date".into(),
            ));
        }
    }
    if fields.i140_approval_date.is_some() && fields.i140_denial_date.is_some() {
        errors.push(err(
            rule_ids::I140_OUTCOME_EXCLUSIVE,
            "i140DenialDate",
            "A case cannot carry both an I-140 approval and a denial".into(),
        ));
    }
}

fn check_rfi_rfe(fields: &CaseFields, errors: &mut Vec<ValidationError>) {
    for entry in &fields.rfi_entries {
        if entry.response_due_date < entry.received_date {
            errors.push(err(
                rule_ids::RFI_DUE_AFTER_RECEIVED,
                "rfiEntries",
                format!("RFI {} response due date precedes its received date", entry.id),
            ));
        }
        if let Some(submitted) = entry.response_submitted_date {
            if submitted < entry.received_date {
                errors.push(err(
                    rule_ids::RFI_RESPONSE_AFTER_RECEIVED,
                    "rfiEntries",
                    format!("RFI {} response predates its received date", entry.id),
                ));
            }
        }
    }
    for entry in &fields.rfe_entries {
        if entry.response_due_date < entry.received_date {
            errors.push(err(
                rule_ids::RFE_DUE_AFTER_RECEIVED,
                "rfeEntries",
                format!("RFE {} response due date precedes its received date", entry.id),
            ));
        }
        if let Some(submitted) = entry.response_submitted_date {
            if submitted < entry.received_date {
                errors.push(err(
                    rule_ids::RFE_RESPONSE_AFTER_RECEIVED,
                    "rfeEntries",
                    format!("RFE {} response predates its received date", entry.id),
                ));
            }
        }
        if let Some(window) = entry.response_window_days {
            if window < 1 {
                errors.push(err(
                    rule_ids::RFE_WINDOW_POSITIVE,
                    "rfeEntries",
                    format!("RFE {} has a non-positive response window", entry.id),
                ));
            }
        }
    }
}

fn err(rule_id: &str, field: &str, message: String) -> ValidationError {
    ValidationError {
        rule_id: rule_id.to_string(),
        field: field.to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RfeEntry, RfiEntry};

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn valid_case() -> CaseFields {
        CaseFields {
            employer_name: "Acme Corp".into(),
            pwd_filing_date: Some(d("2023-10-02")),
            pwd_determination_date: Some(d("2024-01-10")),
            pwd_expiration_date: Some(d("2025-06-30")),
            job_order_start_date: Some(d("2024-03-01")),
            job_order_end_date: Some(d("2024-03-31")),
            sunday_ad_first_date: Some(d("2024-03-03")),
            sunday_ad_second_date: Some(d("2024-03-10")),
            notice_of_filing_start_date: Some(d("2024-03-04")),
            notice_of_filing_end_date: Some(d("2024-03-15")),
            ..Default::default()
        }
    }

    #[test]
    fn valid_case_passes() {
        let result = validate_case(&valid_case());
        assert!(result.valid, "unexpected errors: {:?}", result.errors);
    }

    #[test]
    fn empty_case_passes() {
        // Absent dates are "unknown", not violations.
        assert!(validate_case(&CaseFields::default()).valid);
    }

    #[test]
    fn pwd_ordering_violations_collected() {
        let mut fields = valid_case();
        fields.pwd_determination_date = Some(d("2023-09-01")); // before filing
        fields.pwd_expiration_date = Some(d("2023-01-01")); // before determination
        let result = validate_case(&fields);
        assert!(!result.valid);
        let ids = result.rule_ids();
        assert!(ids.contains(&rule_ids::PWD_DETERMINATION_AFTER_FILING));
        assert!(ids.contains(&rule_ids::PWD_EXPIRATION_AFTER_DETERMINATION));
    }

    #[test]
    fn job_order_must_run_thirty_days() {
        let mut fields = valid_case();
        fields.job_order_end_date = Some(d("2024-03-15"));
        let result = validate_case(&fields);
        assert!(result
            .rule_ids()
            .contains(&rule_ids::JOB_ORDER_THIRTY_DAYS));
    }

    #[test]
    fn sunday_ad_must_fall_on_sunday() {
        let mut fields = valid_case();
        fields.sunday_ad_first_date = Some(d("2024-03-04")); // a Monday
        let result = validate_case(&fields);
        let ids = result.rule_ids();
        assert!(ids.contains(&rule_ids::SUNDAY_AD_ON_SUNDAY));
    }

    #[test]
    fn notice_must_span_ten_business_days() {
        let mut fields = valid_case();
        // Mon 2024-03-04 through Fri 2024-03-08 is only 5 business days.
        fields.notice_of_filing_end_date = Some(d("2024-03-08"));
        let result = validate_case(&fields);
        assert!(result
            .rule_ids()
            .contains(&rule_ids::NOTICE_TEN_BUSINESS_DAYS));
    }

    #[test]
    fn eta9089_filed_inside_window_passes() {
        let mut fields = valid_case();
        fields.eta9089_filing_date = Some(d("2024-05-15"));
        let result = validate_case(&fields);
        assert!(result.valid, "unexpected errors: {:?}", result.errors);
    }

    #[test]
    fn eta9089_filed_during_quiet_period_fails() {
        let mut fields = valid_case();
        // Window opens 2024-04-30 (recruitment end + 30).
        fields.eta9089_filing_date = Some(d("2024-04-10"));
        let result = validate_case(&fields);
        assert!(result
            .rule_ids()
            .contains(&rule_ids::ETA9089_FILED_AFTER_WINDOW_OPENS));
    }

    #[test]
    fn eta9089_filed_after_window_closes_fails() {
        let mut fields = valid_case();
        // Window closes 2024-09-27.
        fields.eta9089_filing_date = Some(d("2024-10-15"));
        let result = validate_case(&fields);
        assert!(result
            .rule_ids()
            .contains(&rule_ids::ETA9089_FILED_BEFORE_WINDOW_CLOSES));
    }

    #[test]
    fn eta9089_filed_after_pwd_expired_fails() {
        let mut fields = valid_case();
        fields.pwd_expiration_date = Some(d("2024-05-01"));
        fields.eta9089_filing_date = Some(d("2024-05-15"));
        let result = validate_case(&fields);
        assert!(result
            .rule_ids()
            .contains(&rule_ids::ETA9089_FILED_BEFORE_PWD_EXPIRES));
    }

    #[test]
    fn window_opening_after_pwd_expiration_is_flagged_not_adjusted() {
        let mut fields = valid_case();
        // PWD expires before recruitment end + 30.
        fields.pwd_expiration_date = Some(d("2024-04-15"));
        let result = validate_case(&fields);
        assert!(result
            .rule_ids()
            .contains(&rule_ids::WINDOW_OPENS_BEFORE_PWD_EXPIRES));
    }

    #[test]
    fn i140_deadline_and_ordering() {
        let mut fields = valid_case();
        fields.eta9089_filing_date = Some(d("2024-05-15"));
        fields.eta9089_certification_date = Some(d("2024-08-01"));
        fields.i140_filing_date = Some(d("2025-03-01")); // 212 days later
        let result = validate_case(&fields);
        assert!(result
            .rule_ids()
            .contains(&rule_ids::I140_FILED_WITHIN_DEADLINE));

        fields.i140_filing_date = Some(d("2024-07-01")); // before certification
        let result = validate_case(&fields);
        assert!(result
            .rule_ids()
            .contains(&rule_ids::I140_FILED_AFTER_CERTIFICATION));
    }

    #[test]
    fn i140_cannot_be_both_approved_and_denied() {
        let mut fields = valid_case();
        fields.i140_approval_date = Some(d("2025-01-01"));
        fields.i140_denial_date = Some(d("2025-01-02"));
        let result = validate_case(&fields);
        assert!(result.rule_ids().contains(&rule_ids::I140_OUTCOME_EXCLUSIVE));
    }

    #[test]
    fn rfi_response_ordering() {
        let mut fields = valid_case();
        fields.rfi_entries = vec![RfiEntry {
            id: "rfi-1".into(),
            received_date: d("2024-06-01"),
            response_due_date: d("2024-07-01"),
            response_submitted_date: Some(d("2024-05-20")),
        }];
        let result = validate_case(&fields);
        assert!(result
            .rule_ids()
            .contains(&rule_ids::RFI_RESPONSE_AFTER_RECEIVED));
    }

    #[test]
    fn rfe_window_must_be_positive() {
        let mut fields = valid_case();
        fields.rfe_entries = vec![RfeEntry {
            id: "rfe-1".into(),
            received_date: d("2024-06-01"),
            response_due_date: d("2024-08-27"),
            response_submitted_date: None,
            response_window_days: Some(0),
        }];
        let result = validate_case(&fields);
        assert!(result.rule_ids().contains(&rule_ids::RFE_WINDOW_POSITIVE));
    }

    #[test]
    fn all_violations_reported_at_once() {
        let mut fields = valid_case();
        fields.pwd_expiration_date = Some(d("2023-01-01"));
        fields.sunday_ad_first_date = Some(d("2024-03-04"));
        fields.job_order_end_date = Some(d("2024-02-01"));
        let result = validate_case(&fields);
        assert!(result.errors.len() >= 3);
    }
}
