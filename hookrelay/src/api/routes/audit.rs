//! Audit log lookup.

use axum::{
    Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;

use crate::api::error::{ApiError, ApiResult};
use crate::api::server::AppState;

#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    pub log_id: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_audit_log))
}

/// Lines of one delivery's audit trail, joined by newlines.
///
/// Unknown ids are reported as 500, matching storage failures.
async fn get_audit_log(
    State(state): State<AppState>,
    Query(query): Query<AuditQuery>,
) -> ApiResult<String> {
    let log_id = query
        .log_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing log_id parameter"))?;

    let relay = super::relay(&state)?;
    let lines = relay
        .audit()
        .lines(&log_id)
        .await
        .map_err(|e| ApiError::internal(format!("Error getting log: {e}")))?;

    Ok(lines.join("\n"))
}
