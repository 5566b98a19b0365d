//! `issues` and `issue_comment`.

use serde::Deserialize;

use super::parse;
use crate::error::RenderError;
use crate::message::{COLOR_GREEN, COLOR_RED, MessageField, NotificationMessage};
use crate::payload::{Comment, Issue, Repository, User, excerpt};

const BODY_LIMIT: usize = 996;

#[derive(Debug, Deserialize)]
struct IssuesEvent {
    action: String,
    issue: Issue,
    repository: Repository,
    sender: User,
}

pub(crate) fn issues(body: &[u8]) -> Result<NotificationMessage, RenderError> {
    let gh: IssuesEvent = parse("issues", body)?;

    let color = match gh.action.as_str() {
        "deleted" | "unpinned" | "closed" => COLOR_RED,
        _ => COLOR_GREEN,
    };

    Ok(NotificationMessage::new(format!(
        "Issue {} on {} (#{})",
        gh.action, gh.repository.full_name, gh.issue.number
    ))
    .color(color)
    .url(gh.issue.html_url.clone())
    .author(gh.sender.author())
    .description(excerpt(gh.issue.body.as_deref(), BODY_LIMIT))
    .field(MessageField::inline("Action", gh.action))
    .field(gh.sender.field())
    .field(MessageField::inline("Title", gh.issue.title)))
}

#[derive(Debug, Deserialize)]
struct IssueCommentEvent {
    action: String,
    issue: Issue,
    comment: Comment,
    repository: Repository,
    sender: User,
}

pub(crate) fn issue_comment(body: &[u8]) -> Result<NotificationMessage, RenderError> {
    let gh: IssueCommentEvent = parse("issue_comment", body)?;

    let color = if gh.action == "deleted" {
        COLOR_RED
    } else {
        COLOR_GREEN
    };

    Ok(NotificationMessage::new(format!(
        "Comment on {} (#{}) {}",
        gh.repository.full_name, gh.issue.number, gh.action
    ))
    .color(color)
    .url(gh.comment.html_url.clone())
    .author(gh.sender.author())
    .description(excerpt(gh.comment.body.as_deref(), BODY_LIMIT))
    .field(gh.sender.field())
    .field(MessageField::inline("Title", gh.issue.title)))
}
