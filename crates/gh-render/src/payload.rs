//! Payload fragments shared across GitHub event kinds.

use serde::Deserialize;

use crate::message::{MessageAuthor, MessageField};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct User {
    pub login: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub html_url: String,
}

impl User {
    /// Markdown link to the user's profile.
    pub fn link(&self) -> String {
        if self.html_url.is_empty() {
            return self.login.clone();
        }
        format!("[{}]({})", self.login, self.html_url)
    }

    pub fn author(&self) -> MessageAuthor {
        MessageAuthor {
            name: self.login.clone(),
            icon_url: non_empty(&self.avatar_url),
            url: non_empty(&self.html_url),
        }
    }

    pub fn field(&self) -> MessageField {
        MessageField::inline("User", self.link())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Repository {
    pub full_name: String,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Issue {
    pub number: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub state: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BranchRef {
    #[serde(rename = "ref", default)]
    pub git_ref: String,
    #[serde(default)]
    pub label: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub merged: bool,
    #[serde(default)]
    pub base: BranchRef,
    #[serde(default)]
    pub head: BranchRef,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Comment {
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub commit_id: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
}

/// Cut `text` to at most `max` characters, appending an ellipsis when cut.
pub fn excerpt(text: Option<&str>, max: usize) -> String {
    let text = text.map(str::trim).unwrap_or_default();
    if text.is_empty() {
        return "No description available".to_string();
    }
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max).collect();
    cut.push_str("...");
    cut
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}
