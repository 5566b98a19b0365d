use serde::Deserialize;

use super::{capitalize, parse};
use crate::error::RenderError;
use crate::message::{COLOR_GREEN, COLOR_RED, MessageField, NotificationMessage};
use crate::payload::{Repository, User, excerpt};

#[derive(Debug, Deserialize)]
struct Release {
    tag_name: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    html_url: String,
    #[serde(default)]
    prerelease: bool,
}

#[derive(Debug, Deserialize)]
struct ReleaseEvent {
    action: String,
    release: Release,
    repository: Repository,
    sender: User,
}

pub(crate) fn release(body: &[u8]) -> Result<NotificationMessage, RenderError> {
    let gh: ReleaseEvent = parse("release", body)?;

    let color = match gh.action.as_str() {
        "created" | "published" | "edited" | "prereleased" | "released" => COLOR_GREEN,
        _ => COLOR_RED,
    };

    let mut msg = NotificationMessage::new(format!(
        "{} release on {}",
        capitalize(&gh.action),
        gh.repository.full_name
    ))
    .color(color)
    .url(gh.release.html_url.clone())
    .author(gh.sender.author())
    .description(excerpt(gh.release.body.as_deref(), 996))
    .field(gh.sender.field())
    .field(MessageField::inline(
        "Release",
        format!("[{}]({})", gh.release.tag_name, gh.release.html_url),
    ));

    if let Some(name) = gh.release.name.filter(|n| !n.is_empty()) {
        msg = msg.field(MessageField::inline("Name", name));
    }
    if gh.release.prerelease {
        msg = msg.footer("Pre-release");
    }
    Ok(msg)
}
