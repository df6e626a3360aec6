//! Dashboard helpers — cross-case deadline grouping and caseload stats.
//!
//! Read-side only: walks stored cases, extracts live deadlines, and shapes
//! them for the dashboard's urgency buckets and per-case summaries.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::deadline_extract::{
    calculate_urgency, extract_deadlines, most_urgent, sort_by_urgency,
};
use crate::types::{CaseRecord, CaseStatus, Deadline, Urgency};

/// A deadline attributed to its case for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseDeadline {
    pub case_id: String,
    pub employer_name: String,
    #[serde(flatten)]
    pub deadline: Deadline,
    pub urgency: Urgency,
}

/// Deadlines across the caseload, bucketed by urgency. Each bucket is
/// sorted most urgent first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeadlineGroups {
    pub overdue: Vec<CaseDeadline>,
    pub this_week: Vec<CaseDeadline>,
    pub this_month: Vec<CaseDeadline>,
    pub later: Vec<CaseDeadline>,
}

/// One row of the caseload table: identity plus the single most urgent
/// deadline, if any.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseSummary {
    pub case_id: String,
    pub employer_name: String,
    pub beneficiary_identifier: String,
    pub case_status: CaseStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub most_urgent: Option<Deadline>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urgency: Option<Urgency>,
}

/// Caseload counts for the dashboard header.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseloadStats {
    pub total_active: usize,
    pub pwd: usize,
    pub recruitment: usize,
    pub eta9089: usize,
    pub i140: usize,
    pub closed: usize,
    pub overdue_deadlines: usize,
    pub due_this_week: usize,
}

/// Bucket every live deadline across the caseload.
pub fn group_deadlines(cases: &[CaseRecord], today: NaiveDate) -> DeadlineGroups {
    let mut groups = DeadlineGroups::default();

    for case in cases {
        let mut deadlines = extract_deadlines(case, today);
        sort_by_urgency(&mut deadlines);
        for deadline in deadlines {
            let urgency = calculate_urgency(deadline.days_until);
            let entry = CaseDeadline {
                case_id: case.id.clone(),
                employer_name: case.fields.employer_name.clone(),
                deadline,
                urgency,
            };
            match urgency {
                Urgency::Overdue => groups.overdue.push(entry),
                Urgency::ThisWeek => groups.this_week.push(entry),
                Urgency::ThisMonth => groups.this_month.push(entry),
                Urgency::Later => groups.later.push(entry),
            }
        }
    }

    for bucket in [
        &mut groups.overdue,
        &mut groups.this_week,
        &mut groups.this_month,
        &mut groups.later,
    ] {
        bucket.sort_by(|a, b| {
            a.deadline
                .days_until
                .cmp(&b.deadline.days_until)
                .then_with(|| {
                    a.deadline
                        .deadline_type
                        .severity_rank()
                        .cmp(&b.deadline.deadline_type.severity_rank())
                })
        });
    }

    groups
}

/// One summary row per non-deleted case.
pub fn case_summaries(cases: &[CaseRecord], today: NaiveDate) -> Vec<CaseSummary> {
    cases
        .iter()
        .filter(|case| !case.deleted)
        .map(|case| {
            let deadlines = extract_deadlines(case, today);
            let top = most_urgent(&deadlines).cloned();
            let urgency = top.as_ref().map(|d| calculate_urgency(d.days_until));
            CaseSummary {
                case_id: case.id.clone(),
                employer_name: case.fields.employer_name.clone(),
                beneficiary_identifier: case.fields.beneficiary_identifier.clone(),
                case_status: case.fields.case_status,
                most_urgent: top,
                urgency,
            }
        })
        .collect()
}

/// Counts for the dashboard header.
pub fn caseload_stats(cases: &[CaseRecord], today: NaiveDate) -> CaseloadStats {
    let mut stats = CaseloadStats::default();

    for case in cases.iter().filter(|c| !c.deleted) {
        match case.fields.case_status {
            CaseStatus::Pwd => stats.pwd += 1,
            CaseStatus::Recruitment => stats.recruitment += 1,
            CaseStatus::Eta9089 => stats.eta9089 += 1,
            CaseStatus::I140 => stats.i140 += 1,
            CaseStatus::Closed => stats.closed += 1,
        }
        if case.fields.case_status != CaseStatus::Closed {
            stats.total_active += 1;
        }
        for deadline in extract_deadlines(case, today) {
            match calculate_urgency(deadline.days_until) {
                Urgency::Overdue => stats.overdue_deadlines += 1,
                Urgency::ThisWeek => stats.due_this_week += 1,
                _ => {}
            }
        }
    }

    stats
}
