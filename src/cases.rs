//! Case mutation entry points.
//!
//! Every write goes through the same pipeline: merge the incoming patch
//! over the stored case, recompute derived dates, validate, recalculate
//! auto-status, persist. Reject-on-invalid is this layer's policy; bulk
//! import downgrades violations to warnings instead and lets the good rows
//! land.

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::auto_status::calculate_auto_status;
use crate::cascade::{apply_patch, run_cascade};
use crate::db::{CaseDb, DbNotification};
use crate::enforcement::{check_deadline_violations, notification_copy};
use crate::error::CaseError;
use crate::types::{
    BulkUpdateOutcome, CaseFields, CasePatch, CaseRecord, CaseStatus, ImportResult, ImportWarning,
    ProgressStatus, SuggestedAction, UserProfile, Violation,
};
use crate::validators::validate_case;

pub const KIND_CASE_CLOSED: &str = "deadline_enforcement";
pub const KIND_DEADLINE_WARNING: &str = "deadline_warning";

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

/// Cascade + validate + auto-status. The single path every persisted case
/// goes through; returns the validation errors when the case is rejected.
fn finalize(fields: &mut CaseFields) -> Result<(), Vec<crate::types::ValidationError>> {
    run_cascade(fields);

    let result = validate_case(fields);
    if !result.valid {
        return Err(result.errors);
    }

    if !fields.progress_status_override {
        let auto = calculate_auto_status(fields);
        fields.case_status = auto.case_status;
        fields.progress_status = auto.progress_status;
    }
    Ok(())
}

/// Create a case from a full field set. Statuses in the input are ignored
/// unless the override flag is set; the auto-status engine decides.
pub fn create_case(db: &CaseDb, mut fields: CaseFields) -> Result<CaseRecord, CaseError> {
    finalize(&mut fields).map_err(CaseError::ValidationFailed)?;

    let now = now_rfc3339();
    let record = CaseRecord {
        id: Uuid::new_v4().to_string(),
        fields,
        deleted: false,
        created_at: now.clone(),
        updated_at: now,
    };
    db.upsert_case(&record)?;
    log::info!(
        "Created case {} ({}) in {}/{}",
        record.id,
        record.fields.employer_name,
        record.fields.case_status.as_str(),
        record.fields.progress_status.as_str()
    );
    Ok(record)
}

/// Apply a partial update. Fields the patch does not touch keep their
/// stored values; the whole pipeline reruns on the merged view.
pub fn update_case(db: &CaseDb, case_id: &str, patch: CasePatch) -> Result<CaseRecord, CaseError> {
    let stored = db
        .get_case(case_id)?
        .ok_or_else(|| CaseError::CaseNotFound(case_id.to_string()))?;

    let mut fields = apply_patch(&stored.fields, patch);
    finalize(&mut fields).map_err(CaseError::ValidationFailed)?;

    let record = CaseRecord {
        id: stored.id,
        fields,
        deleted: stored.deleted,
        created_at: stored.created_at,
        updated_at: now_rfc3339(),
    };
    db.upsert_case(&record)?;
    log::debug!("Updated case {}", record.id);
    Ok(record)
}

/// Bulk import. Each row commits independently; a row that fails validation
/// becomes a warning on the result instead of aborting the batch.
pub fn import_cases(db: &CaseDb, rows: Vec<CaseFields>) -> Result<ImportResult, CaseError> {
    let mut result = ImportResult::default();

    for (row_index, mut fields) in rows.into_iter().enumerate() {
        match finalize(&mut fields) {
            Ok(()) => {
                let now = now_rfc3339();
                let record = CaseRecord {
                    id: Uuid::new_v4().to_string(),
                    fields,
                    deleted: false,
                    created_at: now.clone(),
                    updated_at: now,
                };
                db.upsert_case(&record)?;
                result.imported_count += 1;
                result.imported_ids.push(record.id);
            }
            Err(errors) => {
                log::warn!(
                    "Import row {} rejected: {}",
                    row_index,
                    errors
                        .iter()
                        .map(|e| e.rule_id.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                );
                result
                    .validation_warnings
                    .push(ImportWarning { row_index, errors });
            }
        }
    }

    log::info!(
        "Imported {} case(s), {} row(s) rejected",
        result.imported_count,
        result.validation_warnings.len()
    );
    Ok(result)
}

/// Set both statuses on a batch of cases. Manual statuses are authoritative:
/// the override flag is set on each written case so a later unrelated update
/// cannot recompute them away. Failures are collected per case; successes
/// commit independently.
pub fn bulk_update_status(
    db: &CaseDb,
    case_ids: &[String],
    case_status: CaseStatus,
    progress_status: ProgressStatus,
) -> Result<Vec<BulkUpdateOutcome>, CaseError> {
    let mut outcomes = Vec::with_capacity(case_ids.len());

    for case_id in case_ids {
        let outcome = match db.get_case(case_id)? {
            None => BulkUpdateOutcome {
                case_id: case_id.clone(),
                ok: false,
                error: Some(format!("Case not found: {}", case_id)),
            },
            Some(stored) => {
                let mut fields = stored.fields;
                fields.case_status = case_status;
                fields.progress_status = progress_status;
                fields.progress_status_override = true;
                run_cascade(&mut fields);

                let validation = validate_case(&fields);
                if validation.valid {
                    let record = CaseRecord {
                        id: stored.id,
                        fields,
                        deleted: stored.deleted,
                        created_at: stored.created_at,
                        updated_at: now_rfc3339(),
                    };
                    db.upsert_case(&record)?;
                    BulkUpdateOutcome {
                        case_id: case_id.clone(),
                        ok: true,
                        error: None,
                    }
                } else {
                    BulkUpdateOutcome {
                        case_id: case_id.clone(),
                        ok: false,
                        error: Some(validation.rule_ids().join(", ")),
                    }
                }
            }
        };
        outcomes.push(outcome);
    }

    Ok(outcomes)
}

/// Load a stored profile. The sweep and sync paths need a real profile —
/// defaults here would silently re-enable toggles the user turned off.
pub fn load_profile(db: &CaseDb, user_id: &str) -> Result<UserProfile, CaseError> {
    db.get_profile(user_id)?
        .ok_or_else(|| CaseError::ProfileNotFound(user_id.to_string()))
}

/// Soft-delete: the case drops out of dashboards, deadlines, and sync, but
/// the row survives for recovery.
pub fn delete_case(db: &CaseDb, case_id: &str) -> Result<(), CaseError> {
    if !db.soft_delete_case(case_id, &now_rfc3339())? {
        return Err(CaseError::CaseNotFound(case_id.to_string()));
    }
    log::info!("Soft-deleted case {}", case_id);
    Ok(())
}

/// What the purge removed. `calendar_event_ids` are the external events the
/// caller still has to delete from the user's calendar.
#[derive(Debug, Clone)]
pub struct PurgeSummary {
    pub case_id: String,
    pub notifications_removed: usize,
    pub calendar_event_ids: Vec<String>,
}

/// Hard-delete a case and everything hanging off it, atomically.
pub fn purge_case(db: &CaseDb, case_id: &str) -> Result<PurgeSummary, CaseError> {
    db.with_transaction(|db| {
        let mapped = db.get_calendar_events_for_case(case_id)?;
        let calendar_event_ids = mapped.into_iter().map(|(_, event_id)| event_id).collect();
        let notifications_removed = db.delete_notifications_for_case(case_id)?;
        db.unmap_calendar_events_for_case(case_id)?;
        if !db.delete_case_row(case_id)? {
            return Err(CaseError::CaseNotFound(case_id.to_string()));
        }
        log::info!("Purged case {}", case_id);
        Ok(PurgeSummary {
            case_id: case_id.to_string(),
            notifications_removed,
            calendar_event_ids,
        })
    })
}

/// One enforcement finding from a sweep. `closed` reports whether this sweep
/// actually closed the case (enforcement toggle on and action was close).
#[derive(Debug, Clone)]
pub struct EnforcementOutcome {
    pub case_id: String,
    pub violation: Violation,
    pub closed: bool,
}

/// Login-time enforcement sweep over all active cases.
///
/// Detection always runs and every finding is reported; the close action is
/// applied only when the profile's enforcement toggle is on. Each finding
/// also writes a notification unless the user disabled notifications.
pub fn run_enforcement_sweep(
    db: &CaseDb,
    profile: &UserProfile,
    today: NaiveDate,
) -> Result<Vec<EnforcementOutcome>, CaseError> {
    let mut outcomes = Vec::new();

    for case in db.get_active_cases()? {
        let Some(violation) = check_deadline_violations(&case.fields, today) else {
            continue;
        };

        let enforce = profile.auto_deadline_enforcement_enabled
            && violation.suggested_action == SuggestedAction::Close;

        let copy = notification_copy(&case.fields, &violation);
        let kind = if enforce {
            KIND_CASE_CLOSED
        } else {
            KIND_DEADLINE_WARNING
        };

        db.with_transaction(|db| {
            if enforce {
                let mut fields = case.fields.clone();
                fields.case_status = CaseStatus::Closed;
                let record = CaseRecord {
                    id: case.id.clone(),
                    fields,
                    deleted: case.deleted,
                    created_at: case.created_at.clone(),
                    updated_at: now_rfc3339(),
                };
                db.upsert_case(&record)?;
                log::warn!(
                    "Enforcement closed case {} ({}): {}",
                    case.id,
                    case.fields.employer_name,
                    violation.rule_id
                );
            }
            if profile.notifications_enabled {
                db.insert_notification(&DbNotification {
                    id: Uuid::new_v4().to_string(),
                    case_id: Some(case.id.clone()),
                    kind: kind.to_string(),
                    title: copy.title.clone(),
                    message: copy.message.clone(),
                    read: false,
                    created_at: now_rfc3339(),
                })?;
            }
            Ok::<(), CaseError>(())
        })?;

        outcomes.push(EnforcementOutcome {
            case_id: case.id.clone(),
            violation,
            closed: enforce,
        });
    }

    Ok(outcomes)
}
