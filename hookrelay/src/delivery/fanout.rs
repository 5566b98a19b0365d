use std::sync::Arc;

use gh_render::NotificationMessage;
use tracing::{debug, warn};

use super::ChatSink;
use crate::audit::{AuditContext, AuditLog};

/// Result of delivering to one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOutcome {
    pub channel_id: String,
    pub error: Option<String>,
}

impl DeliveryOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Sends one message to many channels, independently.
#[derive(Clone)]
pub struct Deliverer {
    sink: Arc<dyn ChatSink>,
    audit: AuditLog,
}

impl Deliverer {
    pub fn new(sink: Arc<dyn ChatSink>, audit: AuditLog) -> Self {
        Self { sink, audit }
    }

    /// Deliver `message` to each channel in order.
    ///
    /// A failed channel gets a best-effort plain-text notice and does not stop
    /// the remaining channels. Every attempt is audited under `ctx`.
    pub async fn fanout(
        &self,
        message: &NotificationMessage,
        channel_ids: &[String],
        event: &str,
        ctx: &AuditContext,
    ) -> Vec<DeliveryOutcome> {
        let mut outcomes = Vec::with_capacity(channel_ids.len());

        for channel_id in channel_ids {
            self.audit
                .append(
                    ctx,
                    [format!("Sending event to channel: channelId={channel_id}")],
                )
                .await;

            let error = match self.sink.send_message(channel_id, message).await {
                Ok(()) => {
                    debug!(log_id = %ctx.log_id, channel_id = %channel_id, event, "Delivered event");
                    None
                }
                Err(e) => {
                    let error = e.to_string();
                    warn!(
                        log_id = %ctx.log_id,
                        channel_id = %channel_id,
                        event,
                        error = %error,
                        "Failed to deliver event"
                    );

                    let notice =
                        format!("Could not send event {event} to channel: <#{channel_id}>: {error}");
                    if let Err(notice_err) = self.sink.send_text(channel_id, &notice).await {
                        debug!(
                            channel_id = %channel_id,
                            error = %notice_err,
                            "Failure notice could not be sent either"
                        );
                    }

                    self.audit
                        .append(
                            ctx,
                            [format!(
                                "Could not send event {event} to channel: channelId={channel_id} err={error}"
                            )],
                        )
                        .await;
                    Some(error)
                }
            };

            outcomes.push(DeliveryOutcome {
                channel_id: channel_id.clone(),
                error,
            });
        }

        outcomes
    }
}
