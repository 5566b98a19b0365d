//! Audit log database models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Header row of one request's audit trail.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AuditEntryDbModel {
    pub log_id: String,
    pub destination_id: String,
    pub context_id: String,
    /// Unix epoch milliseconds (UTC).
    pub created_at: i64,
}

/// One appended line.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AuditLineDbModel {
    pub log_id: String,
    pub seq: i64,
    pub line: String,
}
