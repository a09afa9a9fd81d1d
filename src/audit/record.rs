//! Audit record model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kinds of action that leave an audit trail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Ingest,
    Delete,
    Rename,
    Move,
    CreateFolder,
    ViewLogs,
    Download,
}

/// One immutable line of the audit log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub actor: String,
    pub action: AuditAction,
    pub subject: String,
    pub category: String,
    pub path: String,
    pub timestamp: DateTime<Utc>,
}
