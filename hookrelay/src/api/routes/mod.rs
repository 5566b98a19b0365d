//! API route modules.

pub mod audit;
pub mod events;
pub mod health;
pub mod index;
pub mod logging;
pub mod webhook;

use std::sync::Arc;

use axum::Router;

use crate::api::error::ApiError;
use crate::api::server::AppState;
use crate::relay::RelayService;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(index::router())
        .nest("/webhook", webhook::router())
        .nest("/audit", audit::router())
        .nest("/events", events::router())
        .nest("/health", health::router())
        .nest("/logging", logging::router())
        .with_state(state)
}

/// The relay service, or 503 when the state was built without one.
pub(crate) fn relay(state: &AppState) -> Result<&Arc<RelayService>, ApiError> {
    state
        .relay
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Relay service not available"))
}
