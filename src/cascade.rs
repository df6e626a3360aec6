//! Derived-date cascade engine.
//!
//! Whenever an upstream date changes, every dependent date is recomputed
//! from the merged case view. Derived dates are a persisted cache of this
//! pure function — entry points must run the cascade on every create,
//! update, and import, and always over stored-plus-incoming fields, never
//! the raw delta.

use chrono::NaiveDate;

use crate::dates::{earliest, latest};
use crate::deadline_calc;
use crate::types::{CaseFields, CasePatch, DerivedDates};

/// Merge incoming partial fields over the stored record, preferring
/// incoming-if-present. The single place patch semantics live.
pub fn apply_patch(stored: &CaseFields, patch: CasePatch) -> CaseFields {
    let mut merged = stored.clone();

    if let Some(v) = patch.employer_name {
        merged.employer_name = v;
    }
    if let Some(v) = patch.beneficiary_identifier {
        merged.beneficiary_identifier = v;
    }
    if let Some(v) = patch.position_title {
        merged.position_title = v;
    }
    if let Some(v) = patch.case_status {
        merged.case_status = v;
    }
    if let Some(v) = patch.progress_status {
        merged.progress_status = v;
    }
    if let Some(v) = patch.progress_status_override {
        merged.progress_status_override = v;
    }

    merged.pwd_filing_date = patch.pwd_filing_date.merge(stored.pwd_filing_date);
    merged.pwd_determination_date = patch
        .pwd_determination_date
        .merge(stored.pwd_determination_date);
    merged.pwd_expiration_date = patch.pwd_expiration_date.merge(stored.pwd_expiration_date);

    merged.job_order_start_date = patch.job_order_start_date.merge(stored.job_order_start_date);
    merged.job_order_end_date = patch.job_order_end_date.merge(stored.job_order_end_date);
    merged.sunday_ad_first_date = patch.sunday_ad_first_date.merge(stored.sunday_ad_first_date);
    merged.sunday_ad_second_date = patch
        .sunday_ad_second_date
        .merge(stored.sunday_ad_second_date);
    merged.notice_of_filing_start_date = patch
        .notice_of_filing_start_date
        .merge(stored.notice_of_filing_start_date);
    merged.notice_of_filing_end_date = patch
        .notice_of_filing_end_date
        .merge(stored.notice_of_filing_end_date);
    if let Some(v) = patch.additional_recruitment {
        merged.additional_recruitment = v;
    }

    merged.eta9089_filing_date = patch.eta9089_filing_date.merge(stored.eta9089_filing_date);
    merged.eta9089_audit_date = patch.eta9089_audit_date.merge(stored.eta9089_audit_date);
    merged.eta9089_certification_date = patch
        .eta9089_certification_date
        .merge(stored.eta9089_certification_date);
    merged.eta9089_expiration_date = patch
        .eta9089_expiration_date
        .merge(stored.eta9089_expiration_date);

    merged.i140_filing_date = patch.i140_filing_date.merge(stored.i140_filing_date);
    merged.i140_receipt_date = patch.i140_receipt_date.merge(stored.i140_receipt_date);
    merged.i140_approval_date = patch.i140_approval_date.merge(stored.i140_approval_date);
    merged.i140_denial_date = patch.i140_denial_date.merge(stored.i140_denial_date);

    if let Some(v) = patch.rfi_entries {
        merged.rfi_entries = v;
    }
    if let Some(v) = patch.rfe_entries {
        merged.rfe_entries = v;
    }

    merged
}

/// Recompute all derived dates from the authoritative input dates.
/// Idempotent by construction: output depends only on input fields, never
/// on the previous derived values.
pub fn recalculate_derived_dates(fields: &CaseFields) -> DerivedDates {
    let recruitment_start = earliest(&start_candidates(fields));
    let recruitment_end = latest(&end_candidates(fields));

    DerivedDates {
        recruitment_start_date: recruitment_start,
        recruitment_end_date: recruitment_end,
        filing_window_opens: deadline_calc::filing_window_opens(recruitment_end),
        filing_window_closes: deadline_calc::filing_window_closes(recruitment_end),
        recruitment_window_closes: deadline_calc::recruitment_window_closes(recruitment_start),
    }
}

/// Apply the cascade in place.
pub fn run_cascade(fields: &mut CaseFields) {
    fields.derived = recalculate_derived_dates(fields);
}

fn start_candidates(fields: &CaseFields) -> Vec<Option<NaiveDate>> {
    let mut candidates = vec![
        fields.job_order_start_date,
        fields.sunday_ad_first_date,
        fields.sunday_ad_second_date,
        fields.notice_of_filing_start_date,
    ];
    candidates.extend(fields.additional_recruitment.iter().map(|a| a.date));
    candidates
}

fn end_candidates(fields: &CaseFields) -> Vec<Option<NaiveDate>> {
    // Single-day activities (Sunday ads, additional methods) are both start
    // and end candidates.
    let mut candidates = vec![
        fields.job_order_end_date,
        fields.sunday_ad_first_date,
        fields.sunday_ad_second_date,
        fields.notice_of_filing_end_date,
    ];
    candidates.extend(fields.additional_recruitment.iter().map(|a| a.date));
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AdditionalRecruitment, Patch};

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn recruitment_case() -> CaseFields {
        CaseFields {
            employer_name: "Acme Corp".into(),
            job_order_start_date: Some(d("2024-03-01")),
            job_order_end_date: Some(d("2024-03-31")),
            sunday_ad_first_date: Some(d("2024-03-03")),
            sunday_ad_second_date: Some(d("2024-03-10")),
            ..Default::default()
        }
    }

    #[test]
    fn derives_filing_window_from_latest_end() {
        let derived = recalculate_derived_dates(&recruitment_case());
        assert_eq!(derived.recruitment_start_date, Some(d("2024-03-01")));
        assert_eq!(derived.recruitment_end_date, Some(d("2024-03-31")));
        assert_eq!(derived.filing_window_opens, Some(d("2024-04-30")));
        assert_eq!(derived.filing_window_closes, Some(d("2024-09-27")));
        assert_eq!(derived.recruitment_window_closes, Some(d("2024-08-28")));
    }

    #[test]
    fn additional_recruitment_contributes_both_ends() {
        let mut fields = recruitment_case();
        fields.additional_recruitment = vec![
            AdditionalRecruitment {
                method: "job fair".into(),
                date: Some(d("2024-02-20")),
            },
            AdditionalRecruitment {
                method: "campus recruiting".into(),
                date: Some(d("2024-04-05")),
            },
            AdditionalRecruitment {
                method: "radio ad".into(),
                date: None,
            },
        ];
        let derived = recalculate_derived_dates(&fields);
        assert_eq!(derived.recruitment_start_date, Some(d("2024-02-20")));
        assert_eq!(derived.recruitment_end_date, Some(d("2024-04-05")));
    }

    #[test]
    fn no_recruitment_dates_means_no_derived_dates() {
        let derived = recalculate_derived_dates(&CaseFields::default());
        assert_eq!(derived, DerivedDates::default());
    }

    #[test]
    fn cascade_is_idempotent() {
        let mut fields = recruitment_case();
        run_cascade(&mut fields);
        let first = fields.derived.clone();
        run_cascade(&mut fields);
        assert_eq!(fields.derived, first);
    }

    #[test]
    fn stale_derived_values_never_leak_through() {
        let mut fields = recruitment_case();
        // Simulate a stale persisted cache pointing somewhere wrong.
        fields.derived.filing_window_opens = Some(d("1999-01-01"));
        run_cascade(&mut fields);
        assert_eq!(fields.derived.filing_window_opens, Some(d("2024-04-30")));
    }

    #[test]
    fn patch_keeps_untouched_fields() {
        let stored = recruitment_case();
        let patch = CasePatch {
            sunday_ad_second_date: Patch::Set(d("2024-03-17")),
            ..Default::default()
        };
        let merged = apply_patch(&stored, patch);
        assert_eq!(merged.sunday_ad_second_date, Some(d("2024-03-17")));
        // Untouched fields survive the merge.
        assert_eq!(merged.job_order_end_date, Some(d("2024-03-31")));
        assert_eq!(merged.employer_name, "Acme Corp");
    }

    #[test]
    fn patch_clear_removes_a_date() {
        let stored = recruitment_case();
        let patch = CasePatch {
            job_order_end_date: Patch::Clear,
            ..Default::default()
        };
        let merged = apply_patch(&stored, patch);
        assert_eq!(merged.job_order_end_date, None);
        // Cascade over the merged view now falls back to the Sunday ads.
        let derived = recalculate_derived_dates(&merged);
        assert_eq!(derived.recruitment_end_date, Some(d("2024-03-10")));
    }

    #[test]
    fn partial_update_does_not_blank_derived_inputs() {
        // The bug this engine exists to prevent: updating one field must not
        // lose derived dates computed from fields the caller didn't touch.
        let mut stored = recruitment_case();
        run_cascade(&mut stored);

        let patch = CasePatch {
            position_title: Some("Software Engineer II".into()),
            ..Default::default()
        };
        let mut merged = apply_patch(&stored, patch);
        run_cascade(&mut merged);
        assert_eq!(merged.derived, stored.derived);
    }
}
