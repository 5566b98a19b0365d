//! Event modifier database model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::utils::json::{self, JsonContext};

/// An admission/redirect rule, scoped to a destination and optionally to one
/// repository binding.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct EventModifierDbModel {
    pub id: String,
    pub destination_id: String,
    /// `None` applies the rule to every repository of the destination.
    pub repo_id: Option<String>,
    /// JSON array of event patterns.
    pub events: String,
    pub blacklisted: bool,
    pub whitelisted: bool,
    pub redirect_channel: Option<String>,
    /// Higher is evaluated first.
    pub priority: i64,
    /// Unix epoch milliseconds (UTC).
    pub created_at: i64,
}

impl EventModifierDbModel {
    pub fn new(destination_id: impl Into<String>, events: Vec<String>, priority: i64) -> Self {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let events = json::to_string_or_fallback(
            &events,
            "[]",
            JsonContext::ModifierField {
                modifier_id: &id,
                field: "events",
            },
            "Failed to serialize event patterns; storing empty list",
        );
        Self {
            id,
            destination_id: destination_id.into(),
            repo_id: None,
            events,
            blacklisted: false,
            whitelisted: false,
            redirect_channel: None,
            priority,
            created_at: crate::database::time::now_ms(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn for_repo(mut self, repo_id: impl Into<String>) -> Self {
        self.repo_id = Some(repo_id.into());
        self
    }

    pub fn blacklist(mut self) -> Self {
        self.blacklisted = true;
        self
    }

    pub fn whitelist(mut self) -> Self {
        self.whitelisted = true;
        self
    }

    pub fn redirect(mut self, channel_id: impl Into<String>) -> Self {
        self.redirect_channel = Some(channel_id.into());
        self
    }

    pub fn get_events(&self) -> Vec<String> {
        json::parse_or_default(
            &self.events,
            JsonContext::ModifierField {
                modifier_id: &self.id,
                field: "events",
            },
            "Invalid event patterns JSON; treating as empty",
        )
    }
}
