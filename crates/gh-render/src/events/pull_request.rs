//! `pull_request`, `pull_request_review` and `pull_request_review_comment`.

use serde::Deserialize;

use super::parse;
use crate::error::RenderError;
use crate::message::{COLOR_BLUE, COLOR_GREEN, COLOR_RED, MessageField, NotificationMessage};
use crate::payload::{Comment, PullRequest, Repository, User, excerpt};

const BODY_LIMIT: usize = 1000;

#[derive(Debug, Deserialize)]
struct PullRequestEvent {
    action: String,
    pull_request: PullRequest,
    repository: Repository,
    sender: User,
}

pub(crate) fn pull_request(body: &[u8]) -> Result<NotificationMessage, RenderError> {
    let gh: PullRequestEvent = parse("pull_request", body)?;
    let pr = &gh.pull_request;

    let action = if gh.action == "closed" && pr.merged {
        "merged"
    } else {
        gh.action.as_str()
    };
    let color = match action {
        "closed" => COLOR_RED,
        "merged" => COLOR_BLUE,
        _ => COLOR_GREEN,
    };

    Ok(NotificationMessage::new(format!(
        "Pull Request {} on {} (#{})",
        action, gh.repository.full_name, pr.number
    ))
    .color(color)
    .url(pr.html_url.clone())
    .author(gh.sender.author())
    .description(excerpt(pr.body.as_deref(), BODY_LIMIT))
    .field(MessageField::inline("Action", action))
    .field(gh.sender.field())
    .field(MessageField::inline("Title", pr.title.clone()))
    .field(MessageField::new(
        "More Information",
        format!(
            "**Base Ref:** {}\n**Base Label:** {}\n**Head Ref:** {}\n**Head Label:** {}",
            pr.base.git_ref, pr.base.label, pr.head.git_ref, pr.head.label
        ),
    )))
}

#[derive(Debug, Default, Deserialize)]
struct Review {
    #[serde(default)]
    state: String,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    html_url: String,
}

#[derive(Debug, Deserialize)]
struct PullRequestReviewEvent {
    action: String,
    review: Review,
    pull_request: PullRequest,
    repository: Repository,
    sender: User,
}

pub(crate) fn pull_request_review(body: &[u8]) -> Result<NotificationMessage, RenderError> {
    let gh: PullRequestReviewEvent = parse("pull_request_review", body)?;

    let color = match gh.review.state.as_str() {
        "changes_requested" => COLOR_RED,
        "approved" => COLOR_GREEN,
        _ => COLOR_BLUE,
    };

    Ok(NotificationMessage::new(format!(
        "Pull Request Review {} on {} (#{})",
        gh.action, gh.repository.full_name, gh.pull_request.number
    ))
    .color(color)
    .url(gh.review.html_url.clone())
    .author(gh.sender.author())
    .description(excerpt(gh.review.body.as_deref(), BODY_LIMIT))
    .field(gh.sender.field())
    .field(MessageField::inline("State", gh.review.state))
    .field(MessageField::inline("Title", gh.pull_request.title)))
}

#[derive(Debug, Deserialize)]
struct ReviewCommentEvent {
    action: String,
    comment: Comment,
    pull_request: PullRequest,
    repository: Repository,
    sender: User,
}

pub(crate) fn pull_request_review_comment(
    body: &[u8],
) -> Result<NotificationMessage, RenderError> {
    let gh: ReviewCommentEvent = parse("pull_request_review_comment", body)?;

    let color = if gh.action == "deleted" {
        COLOR_RED
    } else {
        COLOR_GREEN
    };

    let mut msg = NotificationMessage::new(format!(
        "Pull Request Review Comment on {} (#{})",
        gh.repository.full_name, gh.pull_request.number
    ))
    .color(color)
    .url(gh.comment.html_url.clone())
    .author(gh.sender.author())
    .description(excerpt(gh.comment.body.as_deref(), BODY_LIMIT))
    .field(gh.sender.field())
    .field(MessageField::inline("Title", gh.pull_request.title));

    if let Some(path) = gh.comment.path.filter(|p| !p.is_empty()) {
        msg = msg.field(MessageField::inline("Path", path));
    }
    Ok(msg)
}
