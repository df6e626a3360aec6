//! PERM labor-certification case tracking core.
//!
//! Derives everything a caseload dashboard needs from a small set of
//! attorney-entered dates: cascaded recruitment windows, regulatory
//! deadlines with urgency buckets, phase/progress auto-status, validation
//! against the ordering rules, and close-vs-warn enforcement for missed
//! windows. SQLite is the working store; calendar and notification
//! delivery are integration concerns that consume the payloads built here.
//!
//! The derivation pipeline is pure (`CaseFields` in, dates/statuses out)
//! and re-runs in full on every write — persisted derived dates are a
//! query cache, never a second source of truth.

pub mod auto_status;
pub mod business_days;
pub mod calendar_events;
pub mod cascade;
pub mod cases;
pub mod dashboard;
pub mod dates;
pub mod db;
pub mod deadline_calc;
pub mod deadline_extract;
pub mod enforcement;
pub mod error;
pub mod migrations;
pub mod notification;
pub mod types;
pub mod validators;

pub use error::CaseError;
