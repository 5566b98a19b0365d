//! Supported event listings.

use axum::{Router, routing::get};

use crate::api::server::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_events))
        .route("/csv", get(list_events_csv))
}

/// One `- kind` line per event with a dedicated renderer.
async fn list_events() -> String {
    gh_render::supported_events()
        .map(|event| format!("- {event}\n"))
        .collect()
}

/// Comma-separated event kinds.
async fn list_events_csv() -> String {
    gh_render::supported_events().collect::<Vec<_>>().join(",")
}
