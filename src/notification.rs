//! Deadline reminder decision layer.
//!
//! Decides which reminder notifications to emit for a case — per-type
//! toggles, lead-days threshold, quiet-hour deferral — and builds the
//! title/body copy. Delivery (push, email) is the integration layer's
//! problem; a delivery failure never affects case state.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::format_iso_date;
use crate::deadline_extract::extract_deadlines;
use crate::types::{CaseRecord, Deadline, NotificationCopy, QuietHours, UserProfile};

pub const KIND_DEADLINE_REMINDER: &str = "deadline_reminder";
pub const KIND_DEADLINE_OVERDUE: &str = "deadline_overdue";

/// A reminder the caller should persist and deliver. `deferred` marks
/// reminders suppressed by quiet hours — the core never sleeps, so it
/// reports the deferral and lets a later sweep emit them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedReminder {
    pub case_id: String,
    pub kind: String,
    #[serde(flatten)]
    pub deadline: Deadline,
    pub copy: NotificationCopy,
    pub deferred: bool,
}

impl PlannedReminder {
    /// Convert to a storable notification row.
    pub fn into_record(self, id: String, created_at: String) -> crate::db::DbNotification {
        crate::db::DbNotification {
            id,
            case_id: Some(self.case_id),
            kind: self.kind,
            title: self.copy.title,
            message: self.copy.message,
            read: false,
            created_at,
        }
    }
}

/// True when `local_hour` falls inside the quiet window. The window wraps
/// midnight when start > end (e.g. 22..7).
pub fn in_quiet_hours(quiet: &QuietHours, local_hour: u8) -> bool {
    if quiet.start_hour == quiet.end_hour {
        return false;
    }
    if quiet.start_hour < quiet.end_hour {
        local_hour >= quiet.start_hour && local_hour < quiet.end_hour
    } else {
        local_hour >= quiet.start_hour || local_hour < quiet.end_hour
    }
}

/// Plan reminders for one case: every live deadline that is overdue or due
/// within the profile's lead window, minus anything the user toggled off.
pub fn plan_deadline_reminders(
    case: &CaseRecord,
    profile: &UserProfile,
    today: NaiveDate,
    local_hour: u8,
) -> Vec<PlannedReminder> {
    if !profile.notifications_enabled {
        return Vec::new();
    }

    let deferred = profile
        .quiet_hours
        .as_ref()
        .is_some_and(|quiet| in_quiet_hours(quiet, local_hour));

    extract_deadlines(case, today)
        .into_iter()
        .filter(|deadline| deadline.days_until <= profile.reminder_lead_days)
        .filter(|deadline| profile.notification_enabled_for(deadline.deadline_type))
        .map(|deadline| {
            let kind = if deadline.days_until < 0 {
                KIND_DEADLINE_OVERDUE
            } else {
                KIND_DEADLINE_REMINDER
            };
            let copy = reminder_copy(case, &deadline);
            PlannedReminder {
                case_id: case.id.clone(),
                kind: kind.to_string(),
                deadline,
                copy,
                deferred,
            }
        })
        .collect()
}

fn reminder_copy(case: &CaseRecord, deadline: &Deadline) -> NotificationCopy {
    let label = deadline.deadline_type.label();
    let employer = &case.fields.employer_name;
    if deadline.days_until < 0 {
        let days = -deadline.days_until;
        NotificationCopy {
            title: format!("Overdue: {} — {}", label, employer),
            message: format!(
                "{} for {} was due {} ({} day{} ago)",
                label,
                employer,
                format_iso_date(deadline.date),
                days,
                if days == 1 { "" } else { "s" }
            ),
        }
    } else {
        NotificationCopy {
            title: format!("{}: {}", label, employer),
            message: format!(
                "{} for {} is due {} ({} day{} away)",
                label,
                employer,
                format_iso_date(deadline.date),
                deadline.days_until,
                if deadline.days_until == 1 { "" } else { "s" }
            ),
        }
    }
}
