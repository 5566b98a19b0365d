//! Deployment events: `deployment` and `deployment_status`.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{capitalize, parse, short_sha};
use crate::error::RenderError;
use crate::message::{COLOR_GREEN, COLOR_RED, MessageField, NotificationMessage};
use crate::payload::{Repository, User, excerpt};

const NO_URL: &str = "No URL available";

fn action_color(action: &str) -> u32 {
    match action {
        "created" | "edited" => COLOR_GREEN,
        _ => COLOR_RED,
    }
}

fn commit_link(repo: &Repository, sha: &str) -> String {
    if sha.is_empty() {
        return "-".to_string();
    }
    format!("[{}]({}/commit/{sha})", short_sha(sha), repo.html_url)
}

fn click_here(url: Option<String>) -> String {
    match url.filter(|u| !u.is_empty()) {
        Some(url) => format!("[Click here]({url})"),
        None => NO_URL.to_string(),
    }
}

#[derive(Debug, Default, Deserialize)]
struct Deployment {
    #[serde(default)]
    sha: String,
    #[serde(default)]
    task: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    environment: String,
    #[serde(default)]
    original_environment: Option<String>,
    #[serde(default)]
    production_environment: bool,
    #[serde(default)]
    creator: Option<User>,
}

impl Deployment {
    /// `original => current` when the deployment was moved.
    fn environment_label(&self) -> String {
        match self.original_environment.as_deref() {
            Some(original) if !original.is_empty() && original != self.environment => {
                format!("{original} => {}", self.environment)
            }
            _ => self.environment.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DeploymentEvent {
    action: String,
    deployment: Deployment,
    repository: Repository,
    sender: User,
}

pub(crate) fn deployment(body: &[u8]) -> Result<NotificationMessage, RenderError> {
    let gh: DeploymentEvent = parse("deployment", body)?;
    let deploy = &gh.deployment;
    let author = deploy.creator.as_ref().unwrap_or(&gh.sender).author();

    Ok(NotificationMessage::new(format!(
        "{} deployment on {}",
        capitalize(&gh.action),
        gh.repository.full_name
    ))
    .color(action_color(&gh.action))
    .url(gh.repository.html_url.clone())
    .author(author)
    .description(excerpt(deploy.description.as_deref(), 996))
    .field(gh.sender.field())
    .field(MessageField::inline("Environment", deploy.environment_label()))
    .field(MessageField::inline(
        "Commit",
        commit_link(&gh.repository, &deploy.sha),
    ))
    .field(MessageField::inline(
        "Is Production",
        deploy.production_environment.to_string(),
    )))
}

#[derive(Debug, Deserialize)]
struct DeploymentStatus {
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    environment_url: Option<String>,
    #[serde(default)]
    log_url: Option<String>,
    #[serde(default)]
    target_url: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    creator: Option<User>,
}

#[derive(Debug, Deserialize)]
struct DeploymentStatusEvent {
    action: String,
    deployment_status: DeploymentStatus,
    #[serde(default)]
    deployment: Deployment,
    repository: Repository,
    sender: User,
}

pub(crate) fn deployment_status(body: &[u8]) -> Result<NotificationMessage, RenderError> {
    let gh: DeploymentStatusEvent = parse("deployment_status", body)?;
    let status = gh.deployment_status;
    let author = status.creator.as_ref().unwrap_or(&gh.sender).author();

    // Status text first, then the deployment's own description.
    let description = [status.description.as_deref(), gh.deployment.description.as_deref()]
        .into_iter()
        .flatten()
        .filter(|d| !d.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    let mut msg = NotificationMessage::new(format!(
        "Deployment status update ({}) on {}",
        gh.action, gh.repository.full_name
    ))
    .color(action_color(&gh.action))
    .url(gh.repository.html_url.clone())
    .author(author)
    .description(excerpt(Some(description.as_str()), 996))
    .field(gh.sender.field())
    .field(MessageField::inline(
        "Commit",
        commit_link(&gh.repository, &gh.deployment.sha),
    ))
    .field(MessageField::inline(
        "Task",
        gh.deployment.task.clone().unwrap_or_else(|| "-".to_string()),
    ))
    .field(MessageField::inline(
        "State",
        status.state.unwrap_or_else(|| "-".to_string()),
    ))
    .field(MessageField::inline(
        "Environment URL",
        click_here(status.environment_url),
    ))
    .field(MessageField::inline("Log URL", click_here(status.log_url)))
    .field(MessageField::inline(
        "Target URL",
        click_here(status.target_url),
    ));

    if let Some(created_at) = status.created_at {
        msg = msg.timestamp(created_at);
    }
    Ok(msg)
}
