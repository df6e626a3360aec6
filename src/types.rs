//! Shared domain types for PERM case tracking.
//!
//! Everything externally visible serializes camelCase; closed string enums
//! serialize snake_case so their literals stay stable across callers and
//! tests. Absent date fields are `None` — never an epoch-zero placeholder.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CaseError;

// ============================================================================
// Status enums
// ============================================================================

/// The phase a case is in. Pure function of the populated dates unless the
/// manual override flag is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    Pwd,
    Recruitment,
    Eta9089,
    I140,
    Closed,
}

impl CaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::Pwd => "pwd",
            CaseStatus::Recruitment => "recruitment",
            CaseStatus::Eta9089 => "eta9089",
            CaseStatus::I140 => "i140",
            CaseStatus::Closed => "closed",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CaseError> {
        match value {
            "pwd" => Ok(CaseStatus::Pwd),
            "recruitment" => Ok(CaseStatus::Recruitment),
            "eta9089" => Ok(CaseStatus::Eta9089),
            "i140" => Ok(CaseStatus::I140),
            "closed" => Ok(CaseStatus::Closed),
            _ => Err(CaseError::UnknownEnumValue {
                field: "caseStatus",
                value: value.to_string(),
            }),
        }
    }
}

/// Sub-state within a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    Working,
    WaitingIntake,
    Filed,
    Approved,
    UnderReview,
    RfiRfe,
}

impl ProgressStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressStatus::Working => "working",
            ProgressStatus::WaitingIntake => "waiting_intake",
            ProgressStatus::Filed => "filed",
            ProgressStatus::Approved => "approved",
            ProgressStatus::UnderReview => "under_review",
            ProgressStatus::RfiRfe => "rfi_rfe",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CaseError> {
        match value {
            "working" => Ok(ProgressStatus::Working),
            "waiting_intake" => Ok(ProgressStatus::WaitingIntake),
            "filed" => Ok(ProgressStatus::Filed),
            "approved" => Ok(ProgressStatus::Approved),
            "under_review" => Ok(ProgressStatus::UnderReview),
            "rfi_rfe" => Ok(ProgressStatus::RfiRfe),
            _ => Err(CaseError::UnknownEnumValue {
                field: "progressStatus",
                value: value.to_string(),
            }),
        }
    }
}

// ============================================================================
// Entries
// ============================================================================

/// A recruitment step beyond the mandatory job order / Sunday ads / notice of
/// filing. Professional-occupation cases require three of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalRecruitment {
    pub method: String,
    pub date: Option<NaiveDate>,
}

/// DOL Request for Information during ETA-9089 review. Fixed statutory
/// response window, no extensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RfiEntry {
    pub id: String,
    pub received_date: NaiveDate,
    pub response_due_date: NaiveDate,
    pub response_submitted_date: Option<NaiveDate>,
}

impl RfiEntry {
    /// An entry still awaiting a response.
    pub fn is_active(&self) -> bool {
        self.response_submitted_date.is_none()
    }
}

/// USCIS Request for Evidence during I-140 review. USCIS may grant a
/// non-standard window, so the response window is overridable per entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RfeEntry {
    pub id: String,
    pub received_date: NaiveDate,
    pub response_due_date: NaiveDate,
    pub response_submitted_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_window_days: Option<i64>,
}

impl RfeEntry {
    pub fn is_active(&self) -> bool {
        self.response_submitted_date.is_none()
    }
}

// ============================================================================
// Case record
// ============================================================================

/// Derived dates recomputed by the cascade engine on every write. These are
/// a cache of the pure function over the authoritative input dates, persisted
/// for query efficiency — never a second source of truth.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedDates {
    pub recruitment_start_date: Option<NaiveDate>,
    pub recruitment_end_date: Option<NaiveDate>,
    pub filing_window_opens: Option<NaiveDate>,
    pub filing_window_closes: Option<NaiveDate>,
    pub recruitment_window_closes: Option<NaiveDate>,
}

/// The merged case view — every field the calculators, validators, and
/// auto-status engine may read.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseFields {
    pub employer_name: String,
    pub beneficiary_identifier: String,
    pub position_title: String,
    pub case_status: CaseStatus,
    pub progress_status: ProgressStatus,
    /// When set, caller-supplied status values are authoritative and the
    /// auto-status calculator's output is ignored for persistence.
    pub progress_status_override: bool,

    // PWD phase
    pub pwd_filing_date: Option<NaiveDate>,
    pub pwd_determination_date: Option<NaiveDate>,
    pub pwd_expiration_date: Option<NaiveDate>,

    // Recruitment phase
    pub job_order_start_date: Option<NaiveDate>,
    pub job_order_end_date: Option<NaiveDate>,
    pub sunday_ad_first_date: Option<NaiveDate>,
    pub sunday_ad_second_date: Option<NaiveDate>,
    pub notice_of_filing_start_date: Option<NaiveDate>,
    pub notice_of_filing_end_date: Option<NaiveDate>,
    pub additional_recruitment: Vec<AdditionalRecruitment>,

    // ETA-9089 phase
    pub eta9089_filing_date: Option<NaiveDate>,
    pub eta9089_audit_date: Option<NaiveDate>,
    pub eta9089_certification_date: Option<NaiveDate>,
    pub eta9089_expiration_date: Option<NaiveDate>,

    // I-140 phase
    pub i140_filing_date: Option<NaiveDate>,
    pub i140_receipt_date: Option<NaiveDate>,
    pub i140_approval_date: Option<NaiveDate>,
    pub i140_denial_date: Option<NaiveDate>,

    pub rfi_entries: Vec<RfiEntry>,
    pub rfe_entries: Vec<RfeEntry>,

    #[serde(flatten)]
    pub derived: DerivedDates,
}

impl Default for CaseFields {
    fn default() -> Self {
        CaseFields {
            employer_name: String::new(),
            beneficiary_identifier: String::new(),
            position_title: String::new(),
            case_status: CaseStatus::Pwd,
            progress_status: ProgressStatus::Working,
            progress_status_override: false,
            pwd_filing_date: None,
            pwd_determination_date: None,
            pwd_expiration_date: None,
            job_order_start_date: None,
            job_order_end_date: None,
            sunday_ad_first_date: None,
            sunday_ad_second_date: None,
            notice_of_filing_start_date: None,
            notice_of_filing_end_date: None,
            additional_recruitment: Vec::new(),
            eta9089_filing_date: None,
            eta9089_audit_date: None,
            eta9089_certification_date: None,
            eta9089_expiration_date: None,
            i140_filing_date: None,
            i140_receipt_date: None,
            i140_approval_date: None,
            i140_denial_date: None,
            rfi_entries: Vec::new(),
            rfe_entries: Vec::new(),
            derived: DerivedDates::default(),
        }
    }
}

/// A stored case: merged fields plus identity and audit columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseRecord {
    pub id: String,
    #[serde(flatten)]
    pub fields: CaseFields,
    /// Soft-delete marker. Deleted cases contribute no deadlines and are
    /// excluded from dashboards; hard deletion goes through the cascade purge.
    pub deleted: bool,
    pub created_at: String,
    pub updated_at: String,
}

// ============================================================================
// Patch combinator
// ============================================================================

/// Three-way patch slot for an optional stored field: leave it alone, clear
/// it, or set a new value. This is the single merge primitive for
/// stored-plus-incoming views — a partial update must never blank out fields
/// the caller didn't touch.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Patch<T> {
    #[default]
    Keep,
    Clear,
    Set(T),
}

impl<T> Patch<T> {
    /// Resolve against the stored value.
    pub fn merge(self, stored: Option<T>) -> Option<T> {
        match self {
            Patch::Keep => stored,
            Patch::Clear => None,
            Patch::Set(value) => Some(value),
        }
    }
}

/// Incoming partial fields for an update. `None` / `Patch::Keep` means "not
/// touched"; list fields replace wholesale when provided.
#[derive(Debug, Clone, Default)]
pub struct CasePatch {
    pub employer_name: Option<String>,
    pub beneficiary_identifier: Option<String>,
    pub position_title: Option<String>,
    pub case_status: Option<CaseStatus>,
    pub progress_status: Option<ProgressStatus>,
    pub progress_status_override: Option<bool>,

    pub pwd_filing_date: Patch<NaiveDate>,
    pub pwd_determination_date: Patch<NaiveDate>,
    pub pwd_expiration_date: Patch<NaiveDate>,

    pub job_order_start_date: Patch<NaiveDate>,
    pub job_order_end_date: Patch<NaiveDate>,
    pub sunday_ad_first_date: Patch<NaiveDate>,
    pub sunday_ad_second_date: Patch<NaiveDate>,
    pub notice_of_filing_start_date: Patch<NaiveDate>,
    pub notice_of_filing_end_date: Patch<NaiveDate>,
    pub additional_recruitment: Option<Vec<AdditionalRecruitment>>,

    pub eta9089_filing_date: Patch<NaiveDate>,
    pub eta9089_audit_date: Patch<NaiveDate>,
    pub eta9089_certification_date: Patch<NaiveDate>,
    pub eta9089_expiration_date: Patch<NaiveDate>,

    pub i140_filing_date: Patch<NaiveDate>,
    pub i140_receipt_date: Patch<NaiveDate>,
    pub i140_approval_date: Patch<NaiveDate>,
    pub i140_denial_date: Patch<NaiveDate>,

    pub rfi_entries: Option<Vec<RfiEntry>>,
    pub rfe_entries: Option<Vec<RfeEntry>>,
}

// ============================================================================
// Deadlines
// ============================================================================

/// Closed set of deadline kinds shared between the extraction engine,
/// calendar sync, and notification copy.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DeadlineType {
    PwdExpiration,
    RecruitmentWindow,
    FilingWindowOpen,
    FilingWindowClose,
    Eta9089Expiration,
    I140FilingWindow,
    RfiResponse,
    RfeResponse,
}

impl DeadlineType {
    pub const ALL: [DeadlineType; 8] = [
        DeadlineType::PwdExpiration,
        DeadlineType::RecruitmentWindow,
        DeadlineType::FilingWindowOpen,
        DeadlineType::FilingWindowClose,
        DeadlineType::Eta9089Expiration,
        DeadlineType::I140FilingWindow,
        DeadlineType::RfiResponse,
        DeadlineType::RfeResponse,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeadlineType::PwdExpiration => "pwd_expiration",
            DeadlineType::RecruitmentWindow => "recruitment_window",
            DeadlineType::FilingWindowOpen => "filing_window_open",
            DeadlineType::FilingWindowClose => "filing_window_close",
            DeadlineType::Eta9089Expiration => "eta9089_expiration",
            DeadlineType::I140FilingWindow => "i140_filing_window",
            DeadlineType::RfiResponse => "rfi_response",
            DeadlineType::RfeResponse => "rfe_response",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CaseError> {
        match value {
            "pwd_expiration" => Ok(DeadlineType::PwdExpiration),
            "recruitment_window" => Ok(DeadlineType::RecruitmentWindow),
            "filing_window_open" => Ok(DeadlineType::FilingWindowOpen),
            "filing_window_close" => Ok(DeadlineType::FilingWindowClose),
            "eta9089_expiration" => Ok(DeadlineType::Eta9089Expiration),
            "i140_filing_window" => Ok(DeadlineType::I140FilingWindow),
            "rfi_response" => Ok(DeadlineType::RfiResponse),
            "rfe_response" => Ok(DeadlineType::RfeResponse),
            _ => Err(CaseError::UnknownEnumValue {
                field: "deadlineType",
                value: value.to_string(),
            }),
        }
    }

    /// Tie-break rank when two deadlines fall on the same day. Lower ranks
    /// first; order matches regulatory severity (an unanswered government
    /// request outranks an equally-due expiration).
    pub fn severity_rank(&self) -> u8 {
        match self {
            DeadlineType::RfiResponse => 0,
            DeadlineType::RfeResponse => 1,
            DeadlineType::FilingWindowClose => 2,
            DeadlineType::I140FilingWindow => 3,
            DeadlineType::Eta9089Expiration => 4,
            DeadlineType::RecruitmentWindow => 5,
            DeadlineType::PwdExpiration => 6,
            DeadlineType::FilingWindowOpen => 7,
        }
    }

    /// Display label matching the production calendar event prefixes.
    pub fn label(&self) -> &'static str {
        match self {
            DeadlineType::PwdExpiration => "PWD Expiration",
            DeadlineType::RecruitmentWindow => "Recruitment Expires",
            DeadlineType::FilingWindowOpen => "Ready to File",
            DeadlineType::FilingWindowClose => "ETA 9089 Filing",
            DeadlineType::Eta9089Expiration => "ETA 9089 Expiration",
            DeadlineType::I140FilingWindow => "I-140 Deadline",
            DeadlineType::RfiResponse => "RFI Response Due",
            DeadlineType::RfeResponse => "RFE Response Due",
        }
    }
}

/// A derived deadline. Transient — produced from a case on read, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deadline {
    #[serde(rename = "type")]
    pub deadline_type: DeadlineType,
    pub date: NaiveDate,
    pub days_until: i64,
}

/// Urgency bucket with fixed thresholds (see `deadline_extract`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Urgency {
    Overdue,
    ThisWeek,
    ThisMonth,
    Later,
}

// ============================================================================
// Validation & enforcement
// ============================================================================

/// A single violated rule. `rule_id` is a stable identifier — callers and
/// tests assert on it, never on message wording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub rule_id: String,
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn rule_ids(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.rule_id.as_str()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestedAction {
    Warn,
    Close,
}

/// An enforcement finding: a missed regulatory deadline and what to do about
/// it. The core decides whether and why; the caller owns the close + write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub rule_id: String,
    pub field: String,
    pub message: String,
    pub suggested_action: SuggestedAction,
}

/// Plain-language notification copy for an enforcement finding. Displayed
/// verbatim, so it carries the employer name for context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationCopy {
    pub title: String,
    pub message: String,
}

// ============================================================================
// User profile (read-only collaborator data)
// ============================================================================

/// Local-time quiet hours during which reminder notifications are deferred.
/// Wraps midnight when `start_hour > end_hour`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuietHours {
    pub start_hour: u8,
    pub end_hour: u8,
}

/// Per-user preferences the core reads to decide whether to fire side
/// effects. The core never computes profile defaults itself; `Default` here
/// mirrors what the account-provisioning collaborator writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: String,
    pub notifications_enabled: bool,
    /// Deadline types missing from the map default to enabled.
    pub notification_type_toggles: BTreeMap<DeadlineType, bool>,
    /// Remind this many days before a deadline falls due.
    pub reminder_lead_days: i64,
    pub quiet_hours: Option<QuietHours>,
    pub calendar_sync_enabled: bool,
    pub calendar_type_toggles: BTreeMap<DeadlineType, bool>,
    pub hidden_case_ids: Vec<String>,
    pub hidden_deadline_types: Vec<DeadlineType>,
    pub auto_deadline_enforcement_enabled: bool,
}

impl Default for UserProfile {
    fn default() -> Self {
        UserProfile {
            user_id: String::new(),
            notifications_enabled: true,
            notification_type_toggles: BTreeMap::new(),
            reminder_lead_days: 7,
            quiet_hours: None,
            calendar_sync_enabled: false,
            calendar_type_toggles: BTreeMap::new(),
            hidden_case_ids: Vec::new(),
            hidden_deadline_types: Vec::new(),
            auto_deadline_enforcement_enabled: false,
        }
    }
}

impl UserProfile {
    pub fn notification_enabled_for(&self, deadline_type: DeadlineType) -> bool {
        self.notifications_enabled
            && *self
                .notification_type_toggles
                .get(&deadline_type)
                .unwrap_or(&true)
    }

    pub fn calendar_sync_enabled_for(&self, deadline_type: DeadlineType) -> bool {
        self.calendar_sync_enabled
            && *self
                .calendar_type_toggles
                .get(&deadline_type)
                .unwrap_or(&true)
            && !self.hidden_deadline_types.contains(&deadline_type)
    }
}

// ============================================================================
// Bulk operation results
// ============================================================================

/// Warning attached to a bulk-import result when a row failed validation.
/// Import never fails the whole batch for one bad row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportWarning {
    pub row_index: usize,
    pub errors: Vec<ValidationError>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub imported_count: usize,
    pub imported_ids: Vec<String>,
    pub validation_warnings: Vec<ImportWarning>,
}

/// Per-case outcome of a bulk status update. Failures are collected, not
/// aborted on; successes commit independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkUpdateOutcome {
    pub case_id: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
