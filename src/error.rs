//! Error types for the case-tracking core.
//!
//! Errors are classified by origin:
//! - Input: malformed dates, unknown enum values — the caller sent bad data
//! - Validation: a mutation was rejected by the regulatory rule engine
//! - Store: SQLite-level failures from the working store
//!
//! Validation *violations* themselves are not errors — validators return
//! structured data and the caller decides policy (reject vs. downgrade to
//! import warnings). `CaseError::ValidationFailed` only appears when an
//! entry point has decided to reject.

use thiserror::Error;

use crate::db::DbError;
use crate::types::ValidationError;

#[derive(Debug, Error)]
pub enum CaseError {
    // Input errors
    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Unknown value '{value}' for {field}")]
    UnknownEnumValue { field: &'static str, value: String },

    // Rejected mutation
    #[error("Validation failed: {}", format_rule_ids(.0))]
    ValidationFailed(Vec<ValidationError>),

    #[error("Case not found: {0}")]
    CaseNotFound(String),

    #[error("User profile not found: {0}")]
    ProfileNotFound(String),

    // Store errors
    #[error(transparent)]
    Db(#[from] DbError),
}

impl CaseError {
    /// Returns true if this error means the caller supplied malformed input
    /// (as opposed to a store failure or a rejected-but-well-formed mutation).
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            CaseError::InvalidDate(_) | CaseError::UnknownEnumValue { .. }
        )
    }

    /// The validation errors behind a rejected mutation, if any.
    pub fn validation_errors(&self) -> Option<&[ValidationError]> {
        match self {
            CaseError::ValidationFailed(errors) => Some(errors),
            _ => None,
        }
    }
}

fn format_rule_ids(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.rule_id.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
