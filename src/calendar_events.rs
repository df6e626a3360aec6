//! Calendar sync payload extraction.
//!
//! Builds the all-day event payloads the calendar sync glue pushes to the
//! user's Google Calendar — one event per live deadline, titled with the
//! production patterns ("PWD Expiration: {employer}", "Ready to File:
//! {employer}", ...). Pure construction: OAuth, retries, and the actual
//! HTTP calls live in the excluded integration layer.

use chrono::NaiveDate;
use serde_json::json;

use crate::dates::{add_days, format_iso_date};
use crate::deadline_extract::extract_deadlines;
use crate::types::{CaseRecord, Deadline, DeadlineType, UserProfile};

/// An all-day calendar event for one case deadline.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEventPayload {
    pub case_id: String,
    pub deadline_type: DeadlineType,
    pub summary: String,
    pub date: NaiveDate,
    pub description: String,
}

impl CalendarEventPayload {
    /// Google Calendar API v3 event body. All-day events use exclusive end
    /// dates, so end = date + 1.
    pub fn google_event_body(&self) -> serde_json::Value {
        json!({
            "summary": self.summary,
            "description": self.description,
            "start": { "date": format_iso_date(self.date) },
            "end": { "date": format_iso_date(add_days(self.date, 1)) },
            "transparency": "transparent",
        })
    }
}

/// Event payloads for every live deadline the user wants synced.
///
/// Applies, in order: the global sync toggle, per-deadline-type toggles,
/// hidden deadline types, and hidden case ids. Closed and deleted cases
/// contribute nothing via extraction.
pub fn extract_calendar_events(
    cases: &[CaseRecord],
    profile: &UserProfile,
    today: NaiveDate,
) -> Vec<CalendarEventPayload> {
    if !profile.calendar_sync_enabled {
        return Vec::new();
    }

    let mut events = Vec::new();
    for case in cases {
        if profile.hidden_case_ids.contains(&case.id) {
            continue;
        }
        for deadline in extract_deadlines(case, today) {
            if !profile.calendar_sync_enabled_for(deadline.deadline_type) {
                continue;
            }
            events.push(build_event(case, &deadline));
        }
    }
    events
}

fn build_event(case: &CaseRecord, deadline: &Deadline) -> CalendarEventPayload {
    CalendarEventPayload {
        case_id: case.id.clone(),
        deadline_type: deadline.deadline_type,
        summary: format!(
            "{}: {}",
            deadline.deadline_type.label(),
            case.fields.employer_name
        ),
        date: deadline.date,
        description: format!(
            "PERM Tracker — {} ({}), {}",
            case.fields.employer_name,
            case.fields.beneficiary_identifier,
            case.fields.position_title
        ),
    }
}
