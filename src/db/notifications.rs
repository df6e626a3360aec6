//! Notification history persistence.

use rusqlite::{params, Row};

use super::{CaseDb, DbError, DbNotification};

fn notification_from_row(row: &Row<'_>) -> Result<DbNotification, rusqlite::Error> {
    Ok(DbNotification {
        id: row.get(0)?,
        case_id: row.get(1)?,
        kind: row.get(2)?,
        title: row.get(3)?,
        message: row.get(4)?,
        read: row.get(5)?,
        created_at: row.get(6)?,
    })
}

const SELECT_COLS: &str = "id, case_id, kind, title, message, read, created_at";

impl CaseDb {
    pub fn insert_notification(&self, notification: &DbNotification) -> Result<(), DbError> {
        self.conn_ref().execute(
            "INSERT INTO notifications (id, case_id, kind, title, message, read, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                notification.id,
                notification.case_id,
                notification.kind,
                notification.title,
                notification.message,
                notification.read,
                notification.created_at,
            ],
        )?;
        Ok(())
    }

    pub fn get_unread_notifications(&self) -> Result<Vec<DbNotification>, DbError> {
        let mut stmt = self.conn_ref().prepare(&format!(
            "SELECT {} FROM notifications WHERE read = 0 ORDER BY created_at DESC",
            SELECT_COLS
        ))?;
        let mapped = stmt.query_map([], notification_from_row)?;
        let mut items = Vec::new();
        for row in mapped {
            items.push(row?);
        }
        Ok(items)
    }

    pub fn get_notifications_for_case(
        &self,
        case_id: &str,
    ) -> Result<Vec<DbNotification>, DbError> {
        let mut stmt = self.conn_ref().prepare(&format!(
            "SELECT {} FROM notifications WHERE case_id = ?1 ORDER BY created_at DESC",
            SELECT_COLS
        ))?;
        let mapped = stmt.query_map(params![case_id], notification_from_row)?;
        let mut items = Vec::new();
        for row in mapped {
            items.push(row?);
        }
        Ok(items)
    }

    /// Returns false when no such notification exists.
    pub fn mark_notification_read(&self, id: &str) -> Result<bool, DbError> {
        let changed = self.conn_ref().execute(
            "UPDATE notifications SET read = 1 WHERE id = ?1",
            params![id],
        )?;
        Ok(changed > 0)
    }

    /// Purge-path cleanup. Returns the number of rows removed.
    pub fn delete_notifications_for_case(&self, case_id: &str) -> Result<usize, DbError> {
        let removed = self.conn_ref().execute(
            "DELETE FROM notifications WHERE case_id = ?1",
            params![case_id],
        )?;
        Ok(removed)
    }
}
