//! CI-related events: `status`, `check_suite`, `check_run`, `workflow_run`
//! and `workflow_job`.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{parse, short_sha};
use crate::error::RenderError;
use crate::message::{COLOR_BLUE, COLOR_GREEN, COLOR_RED, MessageField, NotificationMessage};
use crate::payload::{Repository, User};

fn conclusion_color(conclusion: Option<&str>) -> u32 {
    match conclusion {
        Some("success") => COLOR_GREEN,
        Some("failure" | "timed_out" | "cancelled" | "action_required" | "error") => COLOR_RED,
        _ => COLOR_BLUE,
    }
}

#[derive(Debug, Default, Deserialize)]
struct StatusCommitDetail {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Default, Deserialize)]
struct StatusCommit {
    #[serde(default)]
    sha: String,
    #[serde(default)]
    html_url: String,
    #[serde(default)]
    commit: StatusCommitDetail,
}

#[derive(Debug, Deserialize)]
struct StatusEvent {
    state: String,
    #[serde(default)]
    context: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    target_url: Option<String>,
    #[serde(default)]
    commit: StatusCommit,
    repository: Repository,
    sender: User,
}

pub(crate) fn status(body: &[u8]) -> Result<NotificationMessage, RenderError> {
    let gh: StatusEvent = parse("status", body)?;

    let mut description = gh.description.unwrap_or_default();
    if let Some(target) = gh.target_url.filter(|t| !t.is_empty()) {
        description.push_str(&format!(
            "\n\nFor more information, [click here]({target})."
        ));
    }

    let mut msg = NotificationMessage::new(format!(
        "Status {} on {}",
        gh.state, gh.repository.full_name
    ))
    .color(conclusion_color(Some(gh.state.as_str())))
    .url(gh.repository.html_url.clone())
    .author(gh.sender.author())
    .field(MessageField::new(
        "Commit",
        format!(
            "[``{}``]({}) - {}",
            short_sha(&gh.commit.sha),
            gh.commit.html_url,
            gh.commit.commit.message.lines().next().unwrap_or_default()
        ),
    ))
    .field(gh.sender.field())
    .field(MessageField::inline(
        "Context",
        gh.context.filter(|c| !c.is_empty()).unwrap_or_else(|| "-".to_string()),
    ));

    if !description.trim().is_empty() {
        msg = msg.description(description.trim().to_string());
    }
    Ok(msg)
}

#[derive(Debug, Deserialize)]
struct CheckSuite {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    conclusion: Option<String>,
    #[serde(default)]
    head_branch: Option<String>,
    #[serde(default)]
    head_sha: String,
}

#[derive(Debug, Deserialize)]
struct CheckSuiteEvent {
    action: String,
    check_suite: CheckSuite,
    repository: Repository,
    sender: User,
}

pub(crate) fn check_suite(body: &[u8]) -> Result<NotificationMessage, RenderError> {
    let gh: CheckSuiteEvent = parse("check_suite", body)?;
    let suite = gh.check_suite;

    Ok(NotificationMessage::new(format!(
        "Check Suite {} on {}",
        gh.action, gh.repository.full_name
    ))
    .color(conclusion_color(suite.conclusion.as_deref()))
    .url(gh.repository.html_url.clone())
    .author(gh.sender.author())
    .field(gh.sender.field())
    .field(MessageField::inline(
        "Status",
        suite.status.unwrap_or_else(|| "unknown".to_string()),
    ))
    .field(MessageField::inline(
        "Conclusion",
        suite.conclusion.unwrap_or_else(|| "No conclusion yet!".to_string()),
    ))
    .field(MessageField::inline(
        "Branch",
        suite.head_branch.unwrap_or_else(|| "-".to_string()),
    ))
    .field(MessageField::inline("Commit", short_sha(&suite.head_sha))))
}

#[derive(Debug, Deserialize)]
struct CheckRun {
    #[serde(default)]
    name: String,
    #[serde(default)]
    html_url: String,
    #[serde(default)]
    details_url: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    conclusion: Option<String>,
    #[serde(default)]
    started_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct CheckRunEvent {
    action: String,
    check_run: CheckRun,
    repository: Repository,
    sender: User,
}

pub(crate) fn check_run(body: &[u8]) -> Result<NotificationMessage, RenderError> {
    let gh: CheckRunEvent = parse("check_run", body)?;
    let run = gh.check_run;

    let mut msg = NotificationMessage::new(format!(
        "Check Run {} {} on {}",
        run.name, gh.action, gh.repository.full_name
    ))
    .color(conclusion_color(run.conclusion.as_deref()))
    .url(gh.repository.html_url.clone())
    .author(gh.sender.author())
    .field(gh.sender.field())
    .field(MessageField::inline(
        "Status",
        run.status.unwrap_or_else(|| "No status yet!".to_string()),
    ))
    .field(MessageField::inline("Name", run.name))
    .field(MessageField::inline(
        "Conclusion",
        run.conclusion
            .unwrap_or_else(|| "No conclusion yet!".to_string()),
    ))
    .field(MessageField::inline("URL", run.html_url))
    .field(MessageField::inline(
        "Details URL",
        run.details_url
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| "-".to_string()),
    ));

    if let Some(started_at) = run.started_at {
        msg = msg.timestamp(started_at);
    }
    Ok(msg)
}

#[derive(Debug, Deserialize)]
struct WorkflowRun {
    #[serde(default)]
    name: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    conclusion: Option<String>,
    #[serde(default)]
    head_branch: Option<String>,
    #[serde(default)]
    head_sha: String,
    #[serde(default)]
    html_url: String,
    #[serde(default)]
    event: String,
    #[serde(default)]
    run_number: u64,
    #[serde(default)]
    triggering_actor: Option<User>,
}

#[derive(Debug, Deserialize)]
struct WorkflowRunEvent {
    action: String,
    workflow_run: WorkflowRun,
    repository: Repository,
    sender: User,
}

pub(crate) fn workflow_run(body: &[u8]) -> Result<NotificationMessage, RenderError> {
    let gh: WorkflowRunEvent = parse("workflow_run", body)?;
    let run = gh.workflow_run;

    let mut msg = NotificationMessage::new(format!("Workflow Run: {}", run.name))
        .color(conclusion_color(run.conclusion.as_deref()))
        .url(run.html_url.clone())
        .author(gh.sender.author())
        .field(gh.sender.field())
        .field(MessageField::inline("Action", gh.action))
        .field(MessageField::inline(
            "Status",
            run.status.unwrap_or_else(|| "No status yet!".to_string()),
        ))
        .field(MessageField::inline(
            "Conclusion",
            run.conclusion
                .unwrap_or_else(|| "No conclusion yet!".to_string()),
        ))
        .field(MessageField::inline(
            "Branch",
            run.head_branch.unwrap_or_else(|| "-".to_string()),
        ))
        .field(MessageField::inline("Commit", short_sha(&run.head_sha)))
        .field(MessageField::inline("Event", run.event))
        .field(MessageField::inline("Run Number", run.run_number.to_string()))
        .footer(gh.repository.full_name);

    if let Some(actor) = run.triggering_actor {
        msg = msg.field(MessageField::new("Triggered By", actor.link()));
    }
    Ok(msg)
}

#[derive(Debug, Deserialize)]
struct WorkflowStep {
    #[serde(default)]
    name: String,
    #[serde(default)]
    number: u64,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    conclusion: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WorkflowJob {
    #[serde(default)]
    name: String,
    #[serde(default)]
    workflow_name: Option<String>,
    #[serde(default)]
    head_branch: Option<String>,
    #[serde(default)]
    html_url: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    conclusion: Option<String>,
    #[serde(default)]
    steps: Vec<WorkflowStep>,
}

#[derive(Debug, Deserialize)]
struct WorkflowJobEvent {
    workflow_job: WorkflowJob,
    repository: Repository,
    sender: User,
}

pub(crate) fn workflow_job(body: &[u8]) -> Result<NotificationMessage, RenderError> {
    let gh: WorkflowJobEvent = parse("workflow_job", body)?;
    let job = gh.workflow_job;

    let mut msg = NotificationMessage::new(format!("Workflow Job: {}", job.name))
        .color(conclusion_color(job.conclusion.as_deref()))
        .url(gh.repository.html_url.clone())
        .author(gh.sender.author())
        .field(MessageField::inline(
            "Workflow Name",
            job.workflow_name.unwrap_or_else(|| "-".to_string()),
        ))
        .field(gh.sender.field())
        .field(MessageField::inline(
            "Status",
            job.status.unwrap_or_else(|| "No status yet!".to_string()),
        ))
        .field(MessageField::inline(
            "Conclusion",
            job.conclusion
                .unwrap_or_else(|| "No conclusion yet!".to_string()),
        ))
        .field(MessageField::inline(
            "Branch",
            job.head_branch.unwrap_or_else(|| "-".to_string()),
        ))
        .field(MessageField::inline("URL", job.html_url));

    // One field per step; the normalizer caps the total count.
    for step in job.steps {
        msg = msg.field(MessageField::inline(
            format!("Step {} ({})", step.number, step.name),
            format!(
                "Status: {}\nConclusion: {}",
                step.status.as_deref().unwrap_or("No status yet!"),
                step.conclusion.as_deref().unwrap_or("No conclusion yet!")
            ),
        ));
    }
    Ok(msg)
}
