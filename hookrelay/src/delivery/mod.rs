//! Outbound delivery of rendered notifications.
//!
//! [`ChatSink`] is the narrow contract to the chat platform; [`DiscordSink`]
//! implements it over the Discord REST API. [`Deliverer`] fans a message out
//! to every resolved channel.

mod discord;
mod fanout;

pub use discord::{DEFAULT_API_BASE, DiscordSink, embed_payload};
pub use fanout::{Deliverer, DeliveryOutcome};

use async_trait::async_trait;
use gh_render::NotificationMessage;

use crate::Result;

/// Something that can post into a chat channel.
#[async_trait]
pub trait ChatSink: Send + Sync {
    /// Post a structured message.
    async fn send_message(&self, channel_id: &str, message: &NotificationMessage) -> Result<()>;

    /// Post plain text.
    async fn send_text(&self, channel_id: &str, content: &str) -> Result<()>;
}
