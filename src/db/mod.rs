//! SQLite working store for cases, notifications, profiles, and the
//! calendar event map.
//!
//! Cases persist as a JSON `doc` column (the full field set) plus
//! denormalized status and derived-date columns maintained on every write,
//! so list queries never deserialize rows they end up filtering out. The
//! JSON document is the authoritative copy; the columns are a projection.

use std::path::PathBuf;

use rusqlite::Connection;

pub mod types;
pub use types::*;

pub mod calendar_map;
pub mod cases;
pub mod notifications;
pub mod profiles;

pub struct CaseDb {
    conn: Connection,
}

impl CaseDb {
    /// Open (or create) a database at the given path and apply pending
    /// schema migrations.
    pub fn open_at(path: PathBuf) -> Result<Self, DbError> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(DbError::CreateDir)?;
            }
        }

        let conn = Connection::open(&path)?;

        // WAL for concurrent readers while a write is in flight.
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        crate::migrations::run_migrations(&conn).map_err(DbError::Migration)?;

        Ok(Self { conn })
    }

    /// Borrow the underlying connection for ad-hoc queries.
    pub fn conn_ref(&self) -> &Connection {
        &self.conn
    }

    /// Execute a closure within a SQLite transaction.
    /// Commits on Ok, rolls back on Err.
    pub fn with_transaction<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Self) -> Result<T, E>,
        E: From<DbError>,
    {
        self.conn
            .execute_batch("BEGIN IMMEDIATE")
            .map_err(|e| E::from(DbError::Sqlite(e)))?;
        match f(self) {
            Ok(val) => {
                self.conn
                    .execute_batch("COMMIT")
                    .map_err(|e| E::from(DbError::Sqlite(e)))?;
                Ok(val)
            }
            Err(e) => {
                let _ = self.conn.execute_batch("ROLLBACK");
                Err(e)
            }
        }
    }
}

// =============================================================================
// Shared test utilities
// =============================================================================

#[cfg(test)]
pub mod test_utils {
    use super::CaseDb;

    /// Create a temporary database for testing.
    ///
    /// We leak the `TempDir` so the directory persists for the duration of
    /// the test. Test temp dirs are cleaned up by the OS.
    pub fn test_db() -> CaseDb {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("test.db");
        std::mem::forget(dir);
        CaseDb::open_at(path).expect("Failed to open test database")
    }
}

// =============================================================================
// Tests
// =============================================================================
