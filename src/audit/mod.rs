//! Audit trail
//!
//! Records every mutating action (and every log view) in a bounded,
//! persisted, process-wide log.

pub mod journal;
pub mod record;

pub use journal::AuditLog;
pub use record::{AuditAction, AuditRecord};
