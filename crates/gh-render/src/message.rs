//! Provider-agnostic notification message.
//!
//! A [`NotificationMessage`] is what renderers produce and what the relay
//! normalizes and delivers. It mirrors the shape of a chat "embed" without
//! depending on any particular chat platform.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Color used for additive or successful events.
pub const COLOR_GREEN: u32 = 0x00ff1a;
/// Color used for destructive or failed events.
pub const COLOR_RED: u32 = 0xff0000;
/// Color used for neutral, informational events.
pub const COLOR_BLUE: u32 = 0x3498db;
/// Color used for edits that change behavior.
pub const COLOR_YELLOW: u32 = 0xffff00;
/// Color used for high-severity alerts.
pub const COLOR_DARK_RED: u32 = 0x8b0000;

/// Author block shown above the title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageAuthor {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A named field of the message body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageField {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub inline: bool,
}

impl MessageField {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            inline: false,
        }
    }

    pub fn inline(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            inline: true,
        }
    }
}

/// Structured notification produced by a renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationMessage {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<MessageAuthor>,
    #[serde(default)]
    pub fields: Vec<MessageField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl NotificationMessage {
    /// Create a message with only a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        if !url.is_empty() {
            self.url = Some(url);
        }
        self
    }

    pub fn color(mut self, color: u32) -> Self {
        self.color = Some(color);
        self
    }

    pub fn author(mut self, author: MessageAuthor) -> Self {
        self.author = Some(author);
        self
    }

    pub fn field(mut self, field: MessageField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}
