//! Rendering of GitHub webhook payloads into chat notification messages.
//!
//! The entry point is [`Renderer`], a dispatch table keyed by the
//! `X-GitHub-Event` header. Every renderer is a pure function from the raw
//! payload to a [`NotificationMessage`]; kinds without a dedicated renderer
//! are dumped as key/value fields.

pub mod error;
mod events;
pub mod fallback;
pub mod message;
pub mod payload;
pub mod registry;

pub use crate::{
    error::RenderError,
    message::{MessageAuthor, MessageField, NotificationMessage},
    registry::{Rendered, Renderer, supported_events},
};
