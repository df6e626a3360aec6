//! Shared type definitions for the database layer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors specific to database operations.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Failed to create database directory: {0}")]
    CreateDir(std::io::Error),

    #[error("Schema migration failed: {0}")]
    Migration(String),

    #[error("Failed to (de)serialize stored document: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A row from the `notifications` table. Notifications are append-only
/// history; the UI marks them read but never edits them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbNotification {
    pub id: String,
    /// Absent for notifications not tied to a single case.
    pub case_id: Option<String>,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub created_at: String,
}
