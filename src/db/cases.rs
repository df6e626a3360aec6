//! Case persistence.

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension, Row};

use super::{CaseDb, DbError};
use crate::dates::format_iso_date;
use crate::types::{CaseFields, CaseRecord, CaseStatus};

fn opt_date(date: Option<NaiveDate>) -> Option<String> {
    date.map(format_iso_date)
}

fn record_from_row(row: &Row<'_>) -> Result<(String, String, bool, String, String), rusqlite::Error> {
    Ok((
        row.get::<_, String>(0)?,
        row.get::<_, String>(1)?,
        row.get::<_, bool>(2)?,
        row.get::<_, String>(3)?,
        row.get::<_, String>(4)?,
    ))
}

fn hydrate(
    (id, doc, deleted, created_at, updated_at): (String, String, bool, String, String),
) -> Result<CaseRecord, DbError> {
    let fields: CaseFields = serde_json::from_str(&doc)?;
    Ok(CaseRecord {
        id,
        fields,
        deleted,
        created_at,
        updated_at,
    })
}

const SELECT_COLS: &str = "id, doc, deleted, created_at, updated_at";

impl CaseDb {
    /// Insert or replace a case. The JSON document and the denormalized
    /// columns are written together so they can never drift.
    pub fn upsert_case(&self, record: &CaseRecord) -> Result<(), DbError> {
        let doc = serde_json::to_string(&record.fields)?;
        let fields = &record.fields;
        self.conn_ref().execute(
            "INSERT INTO cases (
                id, doc, case_status, progress_status, employer_name, deleted,
                pwd_expiration_date, recruitment_window_closes,
                filing_window_opens, filing_window_closes,
                eta9089_expiration_date, created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
             ON CONFLICT(id) DO UPDATE SET
                doc = excluded.doc,
                case_status = excluded.case_status,
                progress_status = excluded.progress_status,
                employer_name = excluded.employer_name,
                deleted = excluded.deleted,
                pwd_expiration_date = excluded.pwd_expiration_date,
                recruitment_window_closes = excluded.recruitment_window_closes,
                filing_window_opens = excluded.filing_window_opens,
                filing_window_closes = excluded.filing_window_closes,
                eta9089_expiration_date = excluded.eta9089_expiration_date,
                updated_at = excluded.updated_at",
            params![
                record.id,
                doc,
                fields.case_status.as_str(),
                fields.progress_status.as_str(),
                fields.employer_name,
                record.deleted,
                opt_date(fields.pwd_expiration_date),
                opt_date(fields.derived.recruitment_window_closes),
                opt_date(fields.derived.filing_window_opens),
                opt_date(fields.derived.filing_window_closes),
                opt_date(fields.eta9089_expiration_date),
                record.created_at,
                record.updated_at,
            ],
        )?;
        Ok(())
    }

    pub fn get_case(&self, id: &str) -> Result<Option<CaseRecord>, DbError> {
        let row = self
            .conn_ref()
            .query_row(
                &format!("SELECT {} FROM cases WHERE id = ?1", SELECT_COLS),
                params![id],
                record_from_row,
            )
            .optional()?;
        row.map(hydrate).transpose()
    }

    /// Every non-deleted case, most recently updated first.
    pub fn get_all_cases(&self) -> Result<Vec<CaseRecord>, DbError> {
        self.query_cases(
            &format!(
                "SELECT {} FROM cases WHERE deleted = 0 ORDER BY updated_at DESC",
                SELECT_COLS
            ),
            params![],
        )
    }

    /// Non-deleted cases not yet closed. The enforcement sweep and calendar
    /// sync iterate these.
    pub fn get_active_cases(&self) -> Result<Vec<CaseRecord>, DbError> {
        self.query_cases(
            &format!(
                "SELECT {} FROM cases
                 WHERE deleted = 0 AND case_status != ?1
                 ORDER BY updated_at DESC",
                SELECT_COLS
            ),
            params![CaseStatus::Closed.as_str()],
        )
    }

    /// Mark a case deleted without removing the row. Returns false when no
    /// such case exists.
    pub fn soft_delete_case(&self, id: &str, updated_at: &str) -> Result<bool, DbError> {
        let changed = self.conn_ref().execute(
            "UPDATE cases SET deleted = 1, updated_at = ?2 WHERE id = ?1",
            params![id, updated_at],
        )?;
        Ok(changed > 0)
    }

    /// Remove the row entirely. Callers run this inside the purge
    /// transaction together with notification and calendar-map cleanup.
    pub fn delete_case_row(&self, id: &str) -> Result<bool, DbError> {
        let changed = self
            .conn_ref()
            .execute("DELETE FROM cases WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    fn query_cases(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<CaseRecord>, DbError> {
        let mut stmt = self.conn_ref().prepare(sql)?;
        let mapped = stmt.query_map(params, record_from_row)?;
        let mut records = Vec::new();
        for row in mapped {
            records.push(hydrate(row?)?);
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_utils::test_db;
    use crate::types::{CaseFields, CaseRecord, CaseStatus, ProgressStatus};
    use chrono::NaiveDate;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sample_case(id: &str, employer: &str) -> CaseRecord {
        let mut fields = CaseFields {
            employer_name: employer.into(),
            beneficiary_identifier: "A-123".into(),
            position_title: "Software Engineer".into(),
            pwd_determination_date: Some(d("2024-01-10")),
            pwd_expiration_date: Some(d("2025-06-30")),
            ..Default::default()
        };
        fields.derived.filing_window_closes = Some(d("2024-09-27"));
        CaseRecord {
            id: id.into(),
            fields,
            deleted: false,
            created_at: "2024-01-01T00:00:00Z".into(),
            updated_at: "2024-01-01T00:00:00Z".into(),
        }
    }

    #[test]
    fn upsert_and_get_roundtrip() {
        let db = test_db();
        let record = sample_case("c1", "Acme Corp");
        db.upsert_case(&record).expect("upsert");

        let stored = db.get_case("c1").expect("get").expect("exists");
        assert_eq!(stored.fields.employer_name, "Acme Corp");
        assert_eq!(stored.fields.pwd_expiration_date, Some(d("2025-06-30")));
        assert_eq!(
            stored.fields.derived.filing_window_closes,
            Some(d("2024-09-27"))
        );
    }

    #[test]
    fn upsert_updates_existing() {
        let db = test_db();
        let mut record = sample_case("c1", "Acme Corp");
        db.upsert_case(&record).expect("first upsert");

        record.fields.employer_name = "Acme Corp (renamed)".into();
        record.fields.progress_status = ProgressStatus::Filed;
        db.upsert_case(&record).expect("second upsert");

        let all = db.get_all_cases().expect("query");
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].fields.employer_name, "Acme Corp (renamed)");

        // Denormalized column tracks the document.
        let status: String = db
            .conn_ref()
            .query_row(
                "SELECT progress_status FROM cases WHERE id = 'c1'",
                [],
                |row| row.get(0),
            )
            .expect("direct query");
        assert_eq!(status, "filed");
    }

    #[test]
    fn missing_case_is_none() {
        let db = test_db();
        assert!(db.get_case("nope").expect("get").is_none());
    }

    #[test]
    fn active_cases_exclude_closed_and_deleted() {
        let db = test_db();
        db.upsert_case(&sample_case("c1", "Open Inc")).expect("c1");

        let mut closed = sample_case("c2", "Closed Inc");
        closed.fields.case_status = CaseStatus::Closed;
        db.upsert_case(&closed).expect("c2");

        let mut deleted = sample_case("c3", "Deleted Inc");
        deleted.deleted = true;
        db.upsert_case(&deleted).expect("c3");

        let active = db.get_active_cases().expect("query");
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, "c1");

        let all = db.get_all_cases().expect("query");
        assert_eq!(all.len(), 2, "closed stays visible, deleted does not");
    }

    #[test]
    fn soft_delete_flags_the_row() {
        let db = test_db();
        db.upsert_case(&sample_case("c1", "Acme")).expect("upsert");

        assert!(db
            .soft_delete_case("c1", "2024-06-01T00:00:00Z")
            .expect("soft delete"));
        let stored = db.get_case("c1").expect("get").expect("still present");
        assert!(stored.deleted);
        assert_eq!(stored.updated_at, "2024-06-01T00:00:00Z");

        assert!(!db
            .soft_delete_case("nope", "2024-06-01T00:00:00Z")
            .expect("no match"));
    }

    #[test]
    fn delete_removes_the_row() {
        let db = test_db();
        db.upsert_case(&sample_case("c1", "Acme")).expect("upsert");
        assert!(db.delete_case_row("c1").expect("delete"));
        assert!(db.get_case("c1").expect("get").is_none());
    }
}
