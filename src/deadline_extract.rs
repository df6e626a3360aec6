//! Deadline extraction and urgency grouping.
//!
//! Walks a case's dates and RFI/RFE entries and emits a normalized list of
//! `{type, date, daysUntil}` for dashboards and calendar sync. Supersession
//! rules drop deadlines a later case event has made irrelevant: an expired
//! PWD no longer matters once the ETA-9089 is on file.

use chrono::NaiveDate;

use crate::cascade::recalculate_derived_dates;
use crate::dates::days_between;
use crate::deadline_calc;
use crate::types::{CaseFields, CaseRecord, CaseStatus, Deadline, DeadlineType, Urgency};

/// Urgency thresholds in days. `<0` overdue, `0..=7` this week,
/// `8..=30` this month, `>30` later.
pub const THIS_WEEK_MAX_DAYS: i64 = 7;
pub const THIS_MONTH_MAX_DAYS: i64 = 30;

/// Extract all live deadlines for a stored case. Closed and soft-deleted
/// cases contribute nothing.
pub fn extract_deadlines(record: &CaseRecord, today: NaiveDate) -> Vec<Deadline> {
    if record.deleted {
        return Vec::new();
    }
    extract_case_deadlines(&record.fields, today)
}

/// Extract deadlines from a merged case view. Order is not guaranteed;
/// callers sort with `sort_by_urgency`.
pub fn extract_case_deadlines(fields: &CaseFields, today: NaiveDate) -> Vec<Deadline> {
    if fields.case_status == CaseStatus::Closed {
        return Vec::new();
    }

    // Recompute rather than trusting the persisted cache.
    let derived = recalculate_derived_dates(fields);
    let eta9089_filed = fields.eta9089_filing_date.is_some();
    let i140_filed = fields.i140_filing_date.is_some() || fields.i140_receipt_date.is_some();

    let mut deadlines = Vec::new();
    let mut push = |deadline_type: DeadlineType, date: Option<NaiveDate>| {
        if let Some(date) = date {
            deadlines.push(Deadline {
                deadline_type,
                date,
                days_until: days_between(today, date),
            });
        }
    };

    // Pre-filing deadlines are all superseded by an ETA-9089 filing.
    if !eta9089_filed {
        let pwd_expiration = fields
            .pwd_expiration_date
            .or_else(|| deadline_calc::pwd_expiration(fields.pwd_determination_date));
        push(DeadlineType::PwdExpiration, pwd_expiration);
        push(
            DeadlineType::RecruitmentWindow,
            derived.recruitment_window_closes,
        );
        // "Ready to file" is a countdown; once the window is open it stops
        // being a deadline.
        if derived.filing_window_opens.is_some_and(|d| d >= today) {
            push(DeadlineType::FilingWindowOpen, derived.filing_window_opens);
        }
        push(DeadlineType::FilingWindowClose, derived.filing_window_closes);
    }

    // Certification-stage deadlines are superseded by an I-140 filing.
    if !i140_filed {
        let expiration = fields
            .eta9089_expiration_date
            .or_else(|| deadline_calc::eta9089_expiration(fields.eta9089_certification_date));
        push(DeadlineType::Eta9089Expiration, expiration);
        push(
            DeadlineType::I140FilingWindow,
            deadline_calc::i140_filing_deadline(fields.eta9089_certification_date),
        );
    }

    // Government requests contribute only while unanswered.
    for entry in fields.rfi_entries.iter().filter(|e| e.is_active()) {
        push(DeadlineType::RfiResponse, Some(entry.response_due_date));
    }
    for entry in fields.rfe_entries.iter().filter(|e| e.is_active()) {
        push(DeadlineType::RfeResponse, Some(entry.response_due_date));
    }

    deadlines
}

/// Fixed urgency thresholds.
pub fn calculate_urgency(days_until: i64) -> Urgency {
    if days_until < 0 {
        Urgency::Overdue
    } else if days_until <= THIS_WEEK_MAX_DAYS {
        Urgency::ThisWeek
    } else if days_until <= THIS_MONTH_MAX_DAYS {
        Urgency::ThisMonth
    } else {
        Urgency::Later
    }
}

/// Ascending by `days_until`; ties broken by regulatory severity so an
/// overdue RFI outranks an equally-overdue expiration.
pub fn sort_by_urgency(deadlines: &mut [Deadline]) {
    deadlines.sort_by(|a, b| {
        a.days_until
            .cmp(&b.days_until)
            .then_with(|| a.deadline_type.severity_rank().cmp(&b.deadline_type.severity_rank()))
    });
}

/// The single most urgent deadline, by the same ordering as `sort_by_urgency`.
pub fn most_urgent(deadlines: &[Deadline]) -> Option<&Deadline> {
    deadlines.iter().min_by(|a, b| {
        a.days_until
            .cmp(&b.days_until)
            .then_with(|| a.deadline_type.severity_rank().cmp(&b.deadline_type.severity_rank()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RfeEntry, RfiEntry};

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn recruitment_case() -> CaseFields {
        CaseFields {
            employer_name: "Acme Corp".into(),
            pwd_determination_date: Some(d("2024-01-10")),
            pwd_expiration_date: Some(d("2025-06-30")),
            job_order_start_date: Some(d("2024-03-01")),
            job_order_end_date: Some(d("2024-03-31")),
            sunday_ad_first_date: Some(d("2024-03-03")),
            sunday_ad_second_date: Some(d("2024-03-10")),
            ..Default::default()
        }
    }

    fn types_of(deadlines: &[Deadline]) -> Vec<DeadlineType> {
        deadlines.iter().map(|dl| dl.deadline_type).collect()
    }

    #[test]
    fn urgency_thresholds_are_exact() {
        assert_eq!(calculate_urgency(-1), Urgency::Overdue);
        assert_eq!(calculate_urgency(0), Urgency::ThisWeek);
        assert_eq!(calculate_urgency(7), Urgency::ThisWeek);
        assert_eq!(calculate_urgency(8), Urgency::ThisMonth);
        assert_eq!(calculate_urgency(30), Urgency::ThisMonth);
        assert_eq!(calculate_urgency(31), Urgency::Later);
    }

    #[test]
    fn recruitment_case_emits_window_deadlines() {
        let deadlines = extract_case_deadlines(&recruitment_case(), d("2024-04-01"));
        let types = types_of(&deadlines);
        assert!(types.contains(&DeadlineType::PwdExpiration));
        assert!(types.contains(&DeadlineType::RecruitmentWindow));
        assert!(types.contains(&DeadlineType::FilingWindowOpen));
        assert!(types.contains(&DeadlineType::FilingWindowClose));

        let open = deadlines
            .iter()
            .find(|dl| dl.deadline_type == DeadlineType::FilingWindowOpen)
            .unwrap();
        assert_eq!(open.date, d("2024-04-30"));
        assert_eq!(open.days_until, 29);
    }

    #[test]
    fn pwd_expiration_superseded_by_eta9089_filing() {
        let mut fields = recruitment_case();
        fields.pwd_expiration_date = Some(d("2024-06-01")); // already past
        fields.eta9089_filing_date = Some(d("2024-05-15"));
        let deadlines = extract_case_deadlines(&fields, d("2024-07-01"));
        let types = types_of(&deadlines);
        assert!(!types.contains(&DeadlineType::PwdExpiration));
        assert!(!types.contains(&DeadlineType::FilingWindowClose));
        assert!(!types.contains(&DeadlineType::RecruitmentWindow));
    }

    #[test]
    fn open_filing_window_stops_counting_down() {
        let fields = recruitment_case();
        // Window opened 2024-04-30; today is past it.
        let deadlines = extract_case_deadlines(&fields, d("2024-05-10"));
        assert!(!types_of(&deadlines).contains(&DeadlineType::FilingWindowOpen));
        // The close deadline is still live.
        assert!(types_of(&deadlines).contains(&DeadlineType::FilingWindowClose));
    }

    #[test]
    fn certification_emits_i140_window_until_filed() {
        let mut fields = recruitment_case();
        fields.eta9089_filing_date = Some(d("2024-05-15"));
        fields.eta9089_certification_date = Some(d("2024-08-01"));
        let deadlines = extract_case_deadlines(&fields, d("2024-09-01"));
        let types = types_of(&deadlines);
        assert!(types.contains(&DeadlineType::I140FilingWindow));
        assert!(types.contains(&DeadlineType::Eta9089Expiration));

        fields.i140_filing_date = Some(d("2024-09-15"));
        let deadlines = extract_case_deadlines(&fields, d("2024-10-01"));
        assert!(deadlines.is_empty());
    }

    #[test]
    fn active_rfi_contributes_until_answered() {
        let mut fields = recruitment_case();
        fields.eta9089_filing_date = Some(d("2024-05-15"));
        fields.rfi_entries = vec![RfiEntry {
            id: "rfi-1".into(),
            received_date: d("2024-06-01"),
            response_due_date: d("2024-07-01"),
            response_submitted_date: None,
        }];
        let deadlines = extract_case_deadlines(&fields, d("2024-06-20"));
        let rfi = deadlines
            .iter()
            .find(|dl| dl.deadline_type == DeadlineType::RfiResponse)
            .unwrap();
        assert_eq!(rfi.days_until, 11);

        fields.rfi_entries[0].response_submitted_date = Some(d("2024-06-25"));
        let deadlines = extract_case_deadlines(&fields, d("2024-06-26"));
        assert!(!types_of(&deadlines).contains(&DeadlineType::RfiResponse));
    }

    #[test]
    fn closed_case_contributes_nothing() {
        let mut fields = recruitment_case();
        fields.case_status = CaseStatus::Closed;
        assert!(extract_case_deadlines(&fields, d("2024-04-01")).is_empty());
    }

    #[test]
    fn deleted_case_contributes_nothing() {
        let record = CaseRecord {
            id: "case-1".into(),
            fields: recruitment_case(),
            deleted: true,
            created_at: "2024-01-01T00:00:00Z".into(),
            updated_at: "2024-01-01T00:00:00Z".into(),
        };
        assert!(extract_deadlines(&record, d("2024-04-01")).is_empty());
    }

    #[test]
    fn sort_ascending_with_severity_tie_break() {
        let mut fields = recruitment_case();
        fields.eta9089_filing_date = Some(d("2024-05-15"));
        fields.eta9089_certification_date = Some(d("2024-08-01"));
        // RFE due the same day as the I-140 window closes.
        fields.rfe_entries = vec![RfeEntry {
            id: "rfe-1".into(),
            received_date: d("2024-11-01"),
            response_due_date: d("2025-01-28"),
            response_submitted_date: None,
            response_window_days: None,
        }];
        let mut deadlines = extract_case_deadlines(&fields, d("2024-12-01"));
        sort_by_urgency(&mut deadlines);

        // Certification + 180 lands the I-140 window and the certification
        // expiration on the same day as the RFE response.
        let same_day: Vec<_> = deadlines
            .iter()
            .filter(|dl| dl.date == d("2025-01-28"))
            .collect();
        assert_eq!(same_day.len(), 3);
        // The unanswered government request sorts first.
        assert_eq!(same_day[0].deadline_type, DeadlineType::RfeResponse);
        assert_eq!(same_day[1].deadline_type, DeadlineType::I140FilingWindow);
        assert_eq!(same_day[2].deadline_type, DeadlineType::Eta9089Expiration);
        assert_eq!(
            most_urgent(&deadlines).unwrap().deadline_type,
            deadlines[0].deadline_type
        );
    }
}
