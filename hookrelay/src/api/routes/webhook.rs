//! GitHub webhook endpoint.

use axum::{
    Router,
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;

use crate::api::error::{ApiError, ApiResult};
use crate::api::server::AppState;
use crate::relay::diagnostics::describe_destination;
use crate::relay::{InboundWebhook, RelayError, RelayOutcome};
use crate::webhook::{EVENT_HEADER, SIGNATURE_HEADER};

const MISSING_ID: &str = "This request is missing the id parameter";
const INVALID_ID: &str = "This request has an invalid id parameter";
const NOT_CONFIGURED: &str = "This repository is not configured on hookrelay, ignoring";

#[derive(Debug, Deserialize)]
pub struct WebhookQuery {
    pub id: Option<String>,
}

impl WebhookQuery {
    fn destination_id(self) -> ApiResult<String> {
        self.id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ApiError::bad_request(MISSING_ID))
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(describe_webhook).post(handle_webhook))
}

/// Diagnostic dump of a destination's configuration.
async fn describe_webhook(
    State(state): State<AppState>,
    Query(query): Query<WebhookQuery>,
) -> ApiResult<String> {
    let destination_id = query.destination_id()?;
    let relay = super::relay(&state)?;

    describe_destination(relay.stores(), &destination_id)
        .await
        .map_err(|e| {
            if e.is_not_found() {
                ApiError::not_found(INVALID_ID)
            } else {
                e.into()
            }
        })
}

/// Run a GitHub delivery through the relay.
async fn handle_webhook(
    State(state): State<AppState>,
    Query(query): Query<WebhookQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Response> {
    let destination_id = query.destination_id()?;
    let relay = super::relay(&state)?;

    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
    let request = InboundWebhook {
        destination_id: &destination_id,
        event: header(EVENT_HEADER),
        signature: header(SIGNATURE_HEADER),
        body: &body,
    };

    let outcome = relay
        .handle(request)
        .await
        .map_err(relay_error_to_api_error)?;

    let response = match outcome {
        RelayOutcome::Pong => (StatusCode::OK, "pong").into_response(),
        RelayOutcome::NotConfigured => (StatusCode::PARTIAL_CONTENT, NOT_CONFIGURED).into_response(),
        // Rule evaluation and delivery continue in the background; their
        // outcome is only visible in the audit log.
        RelayOutcome::Accepted { log_id, event, .. } => (
            StatusCode::ACCEPTED,
            format!(
                "View logs at: {}\nGoing to process webhook event now: {event}",
                relay.audit_url(&log_id)
            ),
        )
            .into_response(),
    };
    Ok(response)
}

/// Convert RelayError to ApiError.
fn relay_error_to_api_error(err: RelayError) -> ApiError {
    let message = err.to_string();
    match err {
        RelayError::UnknownDestination => ApiError::not_found(INVALID_ID).with_code("INVALID_ID"),
        RelayError::BadSignature => ApiError::unauthorized(message).with_code("BAD_SIGNATURE"),
        RelayError::MissingEvent => ApiError::bad_request(message).with_code("MISSING_EVENT"),
        RelayError::InvalidJson(_) => ApiError::bad_request(message).with_code("INVALID_PAYLOAD"),
        RelayError::Storage(e) => {
            tracing::error!(error = %e, "Storage failure while relaying webhook");
            ApiError::internal(format!("Internal error: {e}")).with_code("STORAGE_ERROR")
        }
    }
}
