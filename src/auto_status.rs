//! Auto-status calculation: the implicit PERM lifecycle state machine.
//!
//! Status is a pure function of the populated dates, recomputed on every
//! mutation — there is no transition table. Rules are an explicit ordered
//! list evaluated top-to-bottom, first match wins, with the *most advanced
//! milestone checked first*: a case with contradictory legacy data resolves
//! to its most-advanced consistent state, never its earliest. That ordering
//! is a contract, not an implementation detail.
//!
//! The calculator is bypassed for persistence when the manual override flag
//! is set; it stays computable for UI hinting.

use serde::{Deserialize, Serialize};

use crate::types::{CaseFields, CaseStatus, ProgressStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoStatus {
    pub case_status: CaseStatus,
    pub progress_status: ProgressStatus,
}

/// One entry in the ordered rule table.
pub struct StatusRule {
    pub name: &'static str,
    pub applies: fn(&CaseFields) -> bool,
    pub result: AutoStatus,
}

const fn status(case_status: CaseStatus, progress_status: ProgressStatus) -> AutoStatus {
    AutoStatus {
        case_status,
        progress_status,
    }
}

/// The full rule table, most advanced milestone first. An active unresolved
/// government request outranks every milestone — an open RFI forces
/// `rfi_rfe` regardless of any later-stage dates on the record.
pub const STATUS_RULES: &[StatusRule] = &[
    StatusRule {
        name: "active_rfe",
        applies: has_active_rfe,
        result: status(CaseStatus::I140, ProgressStatus::RfiRfe),
    },
    StatusRule {
        name: "active_rfi",
        applies: has_active_rfi,
        result: status(CaseStatus::Eta9089, ProgressStatus::RfiRfe),
    },
    StatusRule {
        name: "i140_approved",
        applies: |f| f.i140_approval_date.is_some(),
        result: status(CaseStatus::I140, ProgressStatus::Approved),
    },
    StatusRule {
        name: "i140_denied",
        applies: |f| f.i140_denial_date.is_some(),
        result: status(CaseStatus::Closed, ProgressStatus::Filed),
    },
    StatusRule {
        name: "i140_filed",
        applies: |f| f.i140_filing_date.is_some() || f.i140_receipt_date.is_some(),
        result: status(CaseStatus::I140, ProgressStatus::Filed),
    },
    StatusRule {
        name: "eta9089_certified",
        applies: |f| f.eta9089_certification_date.is_some(),
        result: status(CaseStatus::I140, ProgressStatus::Working),
    },
    StatusRule {
        name: "eta9089_filed",
        applies: |f| f.eta9089_filing_date.is_some(),
        result: status(CaseStatus::Eta9089, ProgressStatus::Filed),
    },
    StatusRule {
        name: "recruitment_complete",
        applies: recruitment_complete,
        result: status(CaseStatus::Eta9089, ProgressStatus::Working),
    },
    StatusRule {
        name: "recruitment_started",
        applies: recruitment_started,
        result: status(CaseStatus::Recruitment, ProgressStatus::Working),
    },
    // Same result as recruitment_started, on purpose: the source system
    // never distinguished "PWD determined, recruitment under way" from
    // "PWD determined, nothing started". Kept as two rules so the
    // duplication stays visible pending product clarification.
    StatusRule {
        name: "pwd_determined",
        applies: |f| f.pwd_determination_date.is_some(),
        result: status(CaseStatus::Recruitment, ProgressStatus::Working),
    },
    StatusRule {
        name: "pwd_filed",
        applies: |f| f.pwd_filing_date.is_some(),
        result: status(CaseStatus::Pwd, ProgressStatus::Filed),
    },
    StatusRule {
        name: "default",
        applies: |_| true,
        result: status(CaseStatus::Pwd, ProgressStatus::Working),
    },
];

/// Evaluate the rule table against the merged case view.
pub fn calculate_auto_status(fields: &CaseFields) -> AutoStatus {
    for rule in STATUS_RULES {
        if (rule.applies)(fields) {
            return rule.result;
        }
    }
    // The table ends in a catch-all; this is unreachable by construction.
    status(CaseStatus::Pwd, ProgressStatus::Working)
}

/// The name of the rule that fired — for UI hinting and audit trails.
pub fn matching_rule(fields: &CaseFields) -> &'static str {
    STATUS_RULES
        .iter()
        .find(|rule| (rule.applies)(fields))
        .map(|rule| rule.name)
        .unwrap_or("default")
}

fn has_active_rfe(fields: &CaseFields) -> bool {
    fields.rfe_entries.iter().any(|e| e.is_active())
}

fn has_active_rfi(fields: &CaseFields) -> bool {
    fields.rfi_entries.iter().any(|e| e.is_active())
}

/// All four mandatory recruitment activities have concluded.
fn recruitment_complete(fields: &CaseFields) -> bool {
    fields.job_order_end_date.is_some()
        && fields.sunday_ad_first_date.is_some()
        && fields.sunday_ad_second_date.is_some()
        && fields.notice_of_filing_end_date.is_some()
}

fn recruitment_started(fields: &CaseFields) -> bool {
    fields.job_order_start_date.is_some()
        || fields.job_order_end_date.is_some()
        || fields.sunday_ad_first_date.is_some()
        || fields.sunday_ad_second_date.is_some()
        || fields.notice_of_filing_start_date.is_some()
        || fields.notice_of_filing_end_date.is_some()
        || fields
            .additional_recruitment
            .iter()
            .any(|a| a.date.is_some())
}
