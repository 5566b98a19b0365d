//! Relay service: runs one inbound webhook through the pipeline.
//!
//! The request path only authenticates, parses the envelope and finds the
//! repository binding; then it answers with a log id. Everything that
//! touches the destination gate (rule evaluation, rendering, normalization
//! and fan-out) runs in a detached task, so an HTTP caller never waits
//! behind another event's delivery. Outcomes past that point are recorded in
//! the audit log and returned from the task's [`JoinHandle`].

use std::sync::Arc;

use gh_render::{RenderError, Renderer};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::gate::DestinationGate;
use super::normalize::normalize;
use crate::audit::{AuditContext, AuditLog};
use crate::database::models::RepoBindingDbModel;
use crate::database::repositories::{
    AuditRepository, DestinationRepository, EventModifierRepository, RepoBindingRepository,
};
use crate::delivery::{ChatSink, Deliverer, DeliveryOutcome};
use crate::modifiers::{AclFailure, EventCheck, ModifierResolver};
use crate::webhook::{Envelope, PING_EVENT, verify_signature};

/// Storage handles the pipeline reads and writes.
#[derive(Clone)]
pub struct RelayStores {
    pub destinations: Arc<dyn DestinationRepository>,
    pub bindings: Arc<dyn RepoBindingRepository>,
    pub modifiers: Arc<dyn EventModifierRepository>,
    pub audit: Arc<dyn AuditRepository>,
}

/// One inbound webhook request.
#[derive(Debug, Clone, Copy)]
pub struct InboundWebhook<'a> {
    pub destination_id: &'a str,
    /// `X-GitHub-Event`
    pub event: Option<&'a str>,
    /// `X-Hub-Signature-256`
    pub signature: Option<&'a str>,
    pub body: &'a [u8],
}

/// Non-error outcomes of [`RelayService::handle`].
#[derive(Debug)]
pub enum RelayOutcome {
    /// `ping` event; nothing was processed.
    Pong,
    /// The repository is not bound to the destination.
    NotConfigured,
    /// Handed off. `processing` resolves once the event has been denied,
    /// failed to render or been delivered.
    Accepted {
        log_id: String,
        event: String,
        processing: JoinHandle<ProcessingReport>,
    },
}

/// How a handed-off event ended.
#[derive(Debug)]
pub enum ProcessingReport {
    Denied(AclFailure),
    RenderFailed(RenderError),
    StorageFailed(crate::Error),
    /// Fan-out ran; empty when no channel was left to deliver to.
    Delivered(Vec<DeliveryOutcome>),
}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("This request has an invalid id parameter")]
    UnknownDestination,

    #[error("This request has a bad signature, recheck the secret and ensure it isnt the id")]
    BadSignature,

    #[error("This request is missing the X-GitHub-Event header")]
    MissingEvent,

    #[error("This request is not a valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error(transparent)]
    Storage(#[from] crate::Error),
}

/// Everything the detached task needs, owned.
struct PendingEvent {
    ctx: AuditContext,
    header: String,
    event_kind: String,
    repo_name: String,
    binding: RepoBindingDbModel,
    body: Vec<u8>,
}

#[derive(Clone)]
pub struct RelayService {
    stores: RelayStores,
    resolver: ModifierResolver,
    gate: DestinationGate,
    renderer: Renderer,
    deliverer: Deliverer,
    audit: AuditLog,
    public_url: String,
}

impl RelayService {
    pub fn new(stores: RelayStores, sink: Arc<dyn ChatSink>, public_url: impl Into<String>) -> Self {
        let audit = AuditLog::new(Arc::clone(&stores.audit));
        let public_url: String = public_url.into();
        Self {
            resolver: ModifierResolver::new(Arc::clone(&stores.modifiers)),
            gate: DestinationGate::new(),
            renderer: Renderer::new(),
            deliverer: Deliverer::new(sink, audit.clone()),
            audit,
            public_url: public_url.trim_end_matches('/').to_string(),
            stores,
        }
    }

    pub fn stores(&self) -> &RelayStores {
        &self.stores
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    pub fn gate(&self) -> &DestinationGate {
        &self.gate
    }

    /// Where the audit trail of `log_id` can be read.
    pub fn audit_url(&self, log_id: &str) -> String {
        format!("{}/audit?log_id={}", self.public_url, log_id)
    }

    /// Authenticate `request`, find its binding and hand it off.
    pub async fn handle(&self, request: InboundWebhook<'_>) -> Result<RelayOutcome, RelayError> {
        let destination = match self
            .stores
            .destinations
            .get_destination(request.destination_id)
            .await
        {
            Ok(destination) => destination,
            Err(e) if e.is_not_found() => return Err(RelayError::UnknownDestination),
            Err(e) => return Err(e.into()),
        };

        let signature = request.signature.unwrap_or_default();
        if !verify_signature(request.body, signature, destination.secret.as_bytes()) {
            warn!(destination_id = %destination.id, "Rejected webhook with bad signature");
            return Err(RelayError::BadSignature);
        }

        let header = request
            .event
            .filter(|e| !e.is_empty())
            .ok_or(RelayError::MissingEvent)?;
        if header == PING_EVENT {
            debug!(destination_id = %destination.id, "Ping received");
            return Ok(RelayOutcome::Pong);
        }

        let envelope = Envelope::parse(request.body).map_err(RelayError::InvalidJson)?;
        let repo_name = envelope.repo_name();

        let Some(binding) = self
            .stores
            .bindings
            .find_binding(&destination.id, repo_name)
            .await?
        else {
            warn!(
                destination_id = %destination.id,
                repo_name,
                "This repository is not configured, ignoring"
            );
            return Ok(RelayOutcome::NotConfigured);
        };

        let pending = PendingEvent {
            ctx: AuditContext::new(&destination.id, destination.context_id()),
            header: header.to_string(),
            event_kind: envelope.event_kind(header),
            repo_name: repo_name.to_string(),
            binding,
            body: request.body.to_vec(),
        };
        let log_id = pending.ctx.log_id.clone();

        let service = self.clone();
        let processing = tokio::spawn(async move { service.process(pending).await });

        Ok(RelayOutcome::Accepted {
            log_id,
            event: header.to_string(),
            processing,
        })
    }

    /// Gate-held part of the pipeline. Runs detached from the request.
    async fn process(&self, pending: PendingEvent) -> ProcessingReport {
        let PendingEvent {
            ctx,
            header,
            event_kind,
            repo_name,
            binding,
            body,
        } = pending;

        // Held until fan-out finishes.
        let _permit = self.gate.acquire(&ctx.destination_id).await;

        self.audit
            .append(
                &ctx,
                [format!(
                    "Processing event: {header} repoName={repo_name} webhookID={} event={event_kind} logId={}",
                    ctx.destination_id, ctx.log_id
                )],
            )
            .await;

        let check = match self
            .resolver
            .resolve(&ctx.destination_id, &binding.id, &event_kind)
            .await
        {
            Ok(check) => check,
            Err(e) => {
                self.audit
                    .append(&ctx, [format!("Error checking event modifiers: {e}")])
                    .await;
                error!(
                    log_id = %ctx.log_id,
                    destination_id = %ctx.destination_id,
                    error = %e,
                    "Error checking event modifiers"
                );
                return ProcessingReport::StorageFailed(e);
            }
        };

        let check = match check {
            EventCheck::Denied(failure) => {
                self.audit
                    .append(&ctx, [format!("ACL Fail: acl={failure}")])
                    .await;
                warn!(
                    log_id = %ctx.log_id,
                    repo_name = %repo_name,
                    event = %event_kind,
                    reason = %failure,
                    "ACL Fail"
                );
                return ProcessingReport::Denied(failure);
            }
            allowed => allowed,
        };

        let channels = check.channels(binding.get_channel_ids());
        if channels.is_empty() {
            self.audit
                .append(&ctx, ["No channels to deliver to, skipping"])
                .await;
            return ProcessingReport::Delivered(Vec::new());
        }

        let rendered = match self.renderer.render(&header, &body) {
            Ok(rendered) => rendered,
            Err(source) => {
                self.audit
                    .append(&ctx, [format!("Error processing event: {source}")])
                    .await;
                warn!(log_id = %ctx.log_id, event = %header, error = %source, "Render failed");
                return ProcessingReport::RenderFailed(source);
            }
        };
        self.audit
            .append(
                &ctx,
                [if rendered.personalized {
                    "SUCCESS: This event can be personalized"
                } else {
                    "WARNING: This event cannot be personalized, sending a generic summary"
                }],
            )
            .await;

        let message = normalize(rendered.message);
        let outcomes = self
            .deliverer
            .fanout(&message, &channels, &header, &ctx)
            .await;

        let delivered = outcomes.iter().filter(|o| o.is_success()).count();
        self.audit
            .append(
                &ctx,
                [format!(
                    "Delivery finished: {delivered}/{} channels succeeded",
                    outcomes.len()
                )],
            )
            .await;
        info!(
            log_id = %ctx.log_id,
            destination_id = %ctx.destination_id,
            event = %header,
            delivered,
            total = outcomes.len(),
            "Event relayed"
        );
        ProcessingReport::Delivered(outcomes)
    }
}
