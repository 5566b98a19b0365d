//! The few payload fields the relay reads before rendering.

use serde::Deserialize;

/// Minimal view of a webhook payload: the action and the repository name.
/// Either may be absent or `null`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub repository: Option<EnvelopeRepository>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnvelopeRepository {
    #[serde(default)]
    pub full_name: String,
}

impl Envelope {
    pub fn parse(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }

    /// Empty when the payload has no repository.
    pub fn repo_name(&self) -> &str {
        self.repository
            .as_ref()
            .map_or("", |repo| repo.full_name.as_str())
    }

    /// Event kind for modifier matching; see [`event_kind`].
    pub fn event_kind(&self, header: &str) -> String {
        event_kind(header, self.action.as_deref())
    }
}

/// `header` alone, or `header.action` when the payload carries an action.
pub fn event_kind(header: &str, action: Option<&str>) -> String {
    match action {
        Some(action) if !action.is_empty() => format!("{header}.{action}"),
        _ => header.to_string(),
    }
}
