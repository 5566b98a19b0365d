//! Repository binding database model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::utils::json::{self, JsonContext};

/// Association between a destination and one upstream repository.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct RepoBindingDbModel {
    /// Repo identifier; the scope key for repo-level event modifiers.
    pub id: String,
    pub destination_id: String,
    /// Lower-cased `owner/name`.
    pub repo_name: String,
    /// JSON array of channel ids, in fan-out order.
    pub channel_ids: String,
    pub created_by: Option<String>,
    /// Unix epoch milliseconds (UTC).
    pub created_at: i64,
}

impl RepoBindingDbModel {
    pub fn new(
        destination_id: impl Into<String>,
        repo_name: &str,
        channel_ids: Vec<String>,
    ) -> Self {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let channel_ids = json::to_string_or_fallback(
            &channel_ids,
            "[]",
            JsonContext::BindingField {
                binding_id: &id,
                field: "channel_ids",
            },
            "Failed to serialize channel ids; storing empty list",
        );
        Self {
            id,
            destination_id: destination_id.into(),
            repo_name: repo_name.to_lowercase(),
            channel_ids,
            created_by: None,
            created_at: crate::database::time::now_ms(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn get_channel_ids(&self) -> Vec<String> {
        json::parse_or_default(
            &self.channel_ids,
            JsonContext::BindingField {
                binding_id: &self.id,
                field: "channel_ids",
            },
            "Invalid channel ids JSON; treating as empty",
        )
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        crate::database::time::ms_to_datetime(self.created_at)
    }
}
