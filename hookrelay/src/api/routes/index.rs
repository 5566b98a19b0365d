//! Landing page.

use axum::{Router, routing::get};

use crate::api::server::AppState;

const INDEX_TEXT: &str = "This is the hookrelay API. It receives webhooks from GitHub and relays them to Discord channels.

Endpoints:

- Webhooks: /webhook?id=ID
  - Get webhook info: GET /webhook?id=ID
  - Handle GitHub webhook: POST /webhook?id=ID
- Audit log of a delivery: GET /audit?log_id=LOG_ID
- Supported events: GET /events (or /events/csv)
- Health: GET /health/live, GET /health/ready
- Log filter: GET /logging (PUT with the admin token)
";

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(index))
}

async fn index() -> &'static str {
    INDEX_TEXT
}
