//! Repository-level events: `star`, `watch`, `fork`, `public`, `repository`,
//! `create`, `delete`.

use serde::Deserialize;

use super::parse;
use crate::error::RenderError;
use crate::message::{COLOR_GREEN, COLOR_RED, MessageField, NotificationMessage};
use crate::payload::{Repository, User};

#[derive(Debug, Deserialize)]
struct ActionEvent {
    #[serde(default)]
    action: String,
    repository: Repository,
    sender: User,
}

pub(crate) fn star(body: &[u8]) -> Result<NotificationMessage, RenderError> {
    let gh: ActionEvent = parse("star", body)?;

    let (title, color) = if gh.action == "created" {
        (format!("Starred: {}", gh.repository.full_name), COLOR_GREEN)
    } else {
        (format!("Unstarred: {}", gh.repository.full_name), COLOR_RED)
    };

    Ok(NotificationMessage::new(title)
        .color(color)
        .url(gh.repository.html_url.clone())
        .author(gh.sender.author())
        .field(gh.sender.field()))
}

pub(crate) fn watch(body: &[u8]) -> Result<NotificationMessage, RenderError> {
    let gh: ActionEvent = parse("watch", body)?;

    Ok(
        NotificationMessage::new(format!("Watch {} on {}", gh.action, gh.repository.full_name))
            .color(COLOR_GREEN)
            .url(gh.repository.html_url.clone())
            .author(gh.sender.author())
            .field(gh.sender.field()),
    )
}

pub(crate) fn public(body: &[u8]) -> Result<NotificationMessage, RenderError> {
    let gh: ActionEvent = parse("public", body)?;

    Ok(
        NotificationMessage::new(format!("{} is now public", gh.repository.full_name))
            .color(COLOR_GREEN)
            .url(gh.repository.html_url.clone())
            .author(gh.sender.author())
            .field(gh.sender.field()),
    )
}

/// Lifecycle of the repository itself (created, archived, renamed...).
pub(crate) fn repository(body: &[u8]) -> Result<NotificationMessage, RenderError> {
    let gh: ActionEvent = parse("repository", body)?;
    let name = &gh.repository.full_name;

    let (title, color) = if gh.action == "created" {
        (format!("Created: {name}"), COLOR_GREEN)
    } else {
        (format!("{}: {name}", gh.action.to_uppercase()), COLOR_RED)
    };

    Ok(NotificationMessage::new(title)
        .color(color)
        .url(gh.repository.html_url.clone())
        .author(gh.sender.author())
        .field(MessageField::new("User", gh.sender.link())))
}

#[derive(Debug, Deserialize)]
struct ForkEvent {
    forkee: Repository,
    repository: Repository,
    sender: User,
}

pub(crate) fn fork(body: &[u8]) -> Result<NotificationMessage, RenderError> {
    let gh: ForkEvent = parse("fork", body)?;

    Ok(
        NotificationMessage::new(format!("Fork created from {}", gh.repository.full_name))
            .color(COLOR_GREEN)
            .url(gh.forkee.html_url.clone())
            .author(gh.sender.author())
            .field(gh.sender.field())
            .field(MessageField::inline(
                "Fork",
                format!("[{}]({})", gh.forkee.full_name, gh.forkee.html_url),
            )),
    )
}

#[derive(Debug, Deserialize)]
struct RefEvent {
    #[serde(rename = "ref")]
    git_ref: String,
    ref_type: String,
    #[serde(default)]
    master_branch: Option<String>,
    #[serde(default)]
    pusher_type: Option<String>,
    repository: Repository,
    sender: User,
}

pub(crate) fn create(body: &[u8]) -> Result<NotificationMessage, RenderError> {
    let gh: RefEvent = parse("create", body)?;

    let mut msg = NotificationMessage::new(format!(
        "New {} created on {}",
        gh.ref_type, gh.repository.full_name
    ))
    .color(COLOR_GREEN)
    .url(gh.repository.html_url.clone())
    .author(gh.sender.author())
    .field(gh.sender.field())
    .field(MessageField::inline("Ref", gh.git_ref))
    .field(MessageField::inline("Ref Type", gh.ref_type));

    if let Some(master) = gh.master_branch.filter(|m| !m.is_empty()) {
        msg = msg.field(MessageField::inline("Default Branch", master));
    }
    if let Some(pusher_type) = gh.pusher_type.filter(|p| !p.is_empty()) {
        msg = msg.field(MessageField::inline("Pusher Type", pusher_type));
    }
    Ok(msg)
}

pub(crate) fn delete(body: &[u8]) -> Result<NotificationMessage, RenderError> {
    let gh: RefEvent = parse("delete", body)?;

    Ok(NotificationMessage::new(format!(
        "{} deleted on {}",
        super::capitalize(&gh.ref_type),
        gh.repository.full_name
    ))
    .color(COLOR_RED)
    .url(gh.repository.html_url.clone())
    .author(gh.sender.author())
    .field(gh.sender.field())
    .field(MessageField::inline("Ref", gh.git_ref)))
}
