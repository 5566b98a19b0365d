//! Event-kind dispatch table.

use tracing::debug;

use crate::error::RenderError;
use crate::events::{
    access, checks, commits, deployment, issues, pull_request, release, repository,
};
use crate::fallback::render_generic;
use crate::message::NotificationMessage;

type RenderFn = fn(&[u8]) -> Result<NotificationMessage, RenderError>;

struct RendererEntry {
    event: &'static str,
    render: RenderFn,
}

macro_rules! renderer_registry {
    ( $( $event:literal => $render:path ),+ $(,)? ) => {
        &[
            $(
                RendererEntry {
                    event: $event,
                    render: $render,
                },
            )+
        ]
    };
}

static RENDERERS: &[RendererEntry] = renderer_registry![
    "branch_protection_rule" => access::branch_protection_rule,
    "check_run" => checks::check_run,
    "check_suite" => checks::check_suite,
    "commit_comment" => commits::commit_comment,
    "create" => repository::create,
    "delete" => repository::delete,
    "dependabot_alert" => access::dependabot_alert,
    "deployment" => deployment::deployment,
    "deployment_status" => deployment::deployment_status,
    "fork" => repository::fork,
    "issue_comment" => issues::issue_comment,
    "issues" => issues::issues,
    "public" => repository::public,
    "pull_request" => pull_request::pull_request,
    "pull_request_review" => pull_request::pull_request_review,
    "pull_request_review_comment" => pull_request::pull_request_review_comment,
    "push" => commits::push,
    "release" => release::release,
    "repository" => repository::repository,
    "star" => repository::star,
    "status" => checks::status,
    "team" => access::team,
    "watch" => repository::watch,
    "workflow_job" => checks::workflow_job,
    "workflow_run" => checks::workflow_run,
];

/// Event kinds with a dedicated renderer, in table order.
pub fn supported_events() -> impl Iterator<Item = &'static str> {
    RENDERERS.iter().map(|entry| entry.event)
}

/// Result of a render: the message plus whether a dedicated renderer was used.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub message: NotificationMessage,
    pub personalized: bool,
}

/// Maps (event kind, raw payload) to a notification message.
#[derive(Debug, Clone, Copy, Default)]
pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn is_supported(&self, event: &str) -> bool {
        RENDERERS.iter().any(|entry| entry.event == event)
    }

    /// Render `body` for the GitHub event header `event`.
    ///
    /// Unknown kinds fall back to a key/value dump of the payload.
    pub fn render(&self, event: &str, body: &[u8]) -> Result<Rendered, RenderError> {
        match RENDERERS.iter().find(|entry| entry.event == event) {
            Some(entry) => Ok(Rendered {
                message: (entry.render)(body)?,
                personalized: true,
            }),
            None => {
                debug!(event, "No dedicated renderer, using generic dump");
                Ok(Rendered {
                    message: render_generic(event, body)?,
                    personalized: false,
                })
            }
        }
    }
}
