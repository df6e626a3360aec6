//! Mapping between case deadlines and external calendar event ids.
//!
//! The sync glue consults this table to decide update-vs-create for each
//! deadline, and the purge path uses it to find events left behind by a
//! deleted case.

use rusqlite::{params, OptionalExtension};

use super::{CaseDb, DbError};
use crate::types::DeadlineType;

impl CaseDb {
    pub fn map_calendar_event(
        &self,
        case_id: &str,
        deadline_type: DeadlineType,
        external_event_id: &str,
        updated_at: &str,
    ) -> Result<(), DbError> {
        self.conn_ref().execute(
            "INSERT INTO calendar_event_map (case_id, deadline_type, external_event_id, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(case_id, deadline_type) DO UPDATE SET
                external_event_id = excluded.external_event_id,
                updated_at = excluded.updated_at",
            params![case_id, deadline_type.as_str(), external_event_id, updated_at],
        )?;
        Ok(())
    }

    pub fn get_calendar_event(
        &self,
        case_id: &str,
        deadline_type: DeadlineType,
    ) -> Result<Option<String>, DbError> {
        let id = self
            .conn_ref()
            .query_row(
                "SELECT external_event_id FROM calendar_event_map
                 WHERE case_id = ?1 AND deadline_type = ?2",
                params![case_id, deadline_type.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(id)
    }

    /// Every mapped event for one case. The purge path deletes these
    /// externally before unlinking.
    pub fn get_calendar_events_for_case(
        &self,
        case_id: &str,
    ) -> Result<Vec<(DeadlineType, String)>, DbError> {
        let mut stmt = self.conn_ref().prepare(
            "SELECT deadline_type, external_event_id FROM calendar_event_map
             WHERE case_id = ?1",
        )?;
        let mapped = stmt.query_map(params![case_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        let mut items = Vec::new();
        for row in mapped {
            let (raw_type, event_id) = row?;
            // Rows written by an older build with a type this build no
            // longer knows are skipped rather than failing the whole query.
            if let Ok(deadline_type) = DeadlineType::parse(&raw_type) {
                items.push((deadline_type, event_id));
            } else {
                log::warn!("Skipping calendar map row with unknown type '{}'", raw_type);
            }
        }
        Ok(items)
    }

    pub fn unmap_calendar_event(
        &self,
        case_id: &str,
        deadline_type: DeadlineType,
    ) -> Result<bool, DbError> {
        let changed = self.conn_ref().execute(
            "DELETE FROM calendar_event_map WHERE case_id = ?1 AND deadline_type = ?2",
            params![case_id, deadline_type.as_str()],
        )?;
        Ok(changed > 0)
    }

    pub fn unmap_calendar_events_for_case(&self, case_id: &str) -> Result<usize, DbError> {
        let removed = self.conn_ref().execute(
            "DELETE FROM calendar_event_map WHERE case_id = ?1",
            params![case_id],
        )?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_utils::test_db;
    use crate::types::DeadlineType;

    #[test]
    fn map_and_lookup() {
        let db = test_db();
        db.map_calendar_event("c1", DeadlineType::PwdExpiration, "evt-1", "2024-06-01T00:00:00Z")
            .expect("map");

        let found = db
            .get_calendar_event("c1", DeadlineType::PwdExpiration)
            .expect("get");
        assert_eq!(found.as_deref(), Some("evt-1"));

        let missing = db
            .get_calendar_event("c1", DeadlineType::RfiResponse)
            .expect("get");
        assert!(missing.is_none());
    }

    #[test]
    fn remap_replaces_event_id() {
        let db = test_db();
        db.map_calendar_event("c1", DeadlineType::PwdExpiration, "evt-1", "2024-06-01T00:00:00Z")
            .expect("map");
        db.map_calendar_event("c1", DeadlineType::PwdExpiration, "evt-2", "2024-06-02T00:00:00Z")
            .expect("remap");

        let found = db
            .get_calendar_event("c1", DeadlineType::PwdExpiration)
            .expect("get");
        assert_eq!(found.as_deref(), Some("evt-2"));
    }

    #[test]
    fn case_scoped_listing_and_unmap() {
        let db = test_db();
        db.map_calendar_event("c1", DeadlineType::PwdExpiration, "evt-1", "2024-06-01T00:00:00Z")
            .expect("map");
        db.map_calendar_event("c1", DeadlineType::FilingWindowClose, "evt-2", "2024-06-01T00:00:00Z")
            .expect("map");
        db.map_calendar_event("c2", DeadlineType::PwdExpiration, "evt-3", "2024-06-01T00:00:00Z")
            .expect("map");

        let events = db.get_calendar_events_for_case("c1").expect("list");
        assert_eq!(events.len(), 2);

        assert!(db
            .unmap_calendar_event("c1", DeadlineType::PwdExpiration)
            .expect("unmap"));
        assert_eq!(db.unmap_calendar_events_for_case("c1").expect("purge"), 1);
        assert!(db.get_calendar_events_for_case("c1").expect("list").is_empty());
        assert_eq!(db.get_calendar_events_for_case("c2").expect("list").len(), 1);
    }
}
