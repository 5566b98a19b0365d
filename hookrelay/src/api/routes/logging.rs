//! Log filter routes.
//!
//! `GET /logging` reports the active filter directive. `PUT /logging`
//! replaces it at runtime and requires `Authorization: Bearer <admin token>`;
//! without a configured admin token the filter cannot be changed.

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, header},
    routing::get,
};
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::api::server::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct LogFilterBody {
    pub filter: String,
}

/// Create the logging router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_filter).put(set_filter))
}

async fn get_filter(State(state): State<AppState>) -> ApiResult<Json<LogFilterBody>> {
    let config = state
        .logging_config
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Logging configuration not available"))?;
    Ok(Json(LogFilterBody {
        filter: config.get_filter(),
    }))
}

async fn set_filter(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<LogFilterBody>,
) -> ApiResult<Json<LogFilterBody>> {
    let Some(expected) = state.admin_token.as_deref() else {
        return Err(ApiError::forbidden("Log filter changes are disabled"));
    };
    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    if presented != Some(expected) {
        return Err(ApiError::unauthorized("Invalid admin token"));
    }

    let config = state
        .logging_config
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Logging configuration not available"))?;
    config
        .set_filter(&body.filter)
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    Ok(Json(LogFilterBody {
        filter: config.get_filter(),
    }))
}
