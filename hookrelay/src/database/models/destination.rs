//! Destination database model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered relay target. The webhook URL carries its `id`, and GitHub
/// signs every delivery with its `secret`.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DestinationDbModel {
    pub id: String,
    #[serde(skip_serializing)]
    pub secret: String,
    /// Free-text note shown in the diagnostic dump.
    pub comment: String,
    /// Chat server owning the destination; recorded as audit context.
    pub guild_id: Option<String>,
    /// Unix epoch milliseconds (UTC).
    pub created_at: i64,
}

impl DestinationDbModel {
    pub fn new(secret: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().simple().to_string(),
            secret: secret.into(),
            comment: comment.into(),
            guild_id: None,
            created_at: crate::database::time::now_ms(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_guild(mut self, guild_id: impl Into<String>) -> Self {
        self.guild_id = Some(guild_id.into());
        self
    }

    /// Context id used for audit entries of this destination.
    pub fn context_id(&self) -> &str {
        self.guild_id.as_deref().unwrap_or_default()
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        crate::database::time::ms_to_datetime(self.created_at)
    }
}
