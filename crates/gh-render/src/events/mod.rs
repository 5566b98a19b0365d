//! Per-event-kind renderers.
//!
//! Each renderer deserializes the typed payload it needs and builds a
//! [`NotificationMessage`](crate::NotificationMessage). Renderers are pure.

pub(crate) mod access;
pub(crate) mod checks;
pub(crate) mod commits;
pub(crate) mod deployment;
pub(crate) mod issues;
pub(crate) mod pull_request;
pub(crate) mod release;
pub(crate) mod repository;

use serde::de::DeserializeOwned;

use crate::error::RenderError;

pub(crate) fn parse<T: DeserializeOwned>(event: &str, body: &[u8]) -> Result<T, RenderError> {
    serde_json::from_slice(body).map_err(|e| RenderError::invalid(event, e))
}

/// Short form of a commit SHA.
pub(crate) fn short_sha(sha: &str) -> &str {
    match sha.char_indices().nth(7) {
        Some((idx, _)) => &sha[..idx],
        None => sha,
    }
}

/// Uppercase the first character of an action name ("opened" -> "Opened").
pub(crate) fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
