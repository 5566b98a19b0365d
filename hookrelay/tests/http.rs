//! HTTP-level behavior of the router, driven with `oneshot`.

mod common;

use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use common::{Harness, sign, star_payload};
use hookrelay::api::{ApiServer, ApiServerConfig};
use hookrelay::database::models::EventModifierDbModel;
use tower::ServiceExt;

fn router(h: &Harness) -> Router {
    ApiServer::with_state(ApiServerConfig::default(), h.container.app_state(None)).build_router()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

fn post(uri: &str, event: Option<&str>, signature: Option<&str>, body: Vec<u8>) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri(uri);
    if let Some(event) = event {
        builder = builder.header("X-GitHub-Event", event);
    }
    if let Some(signature) = signature {
        builder = builder.header("X-Hub-Signature-256", signature);
    }
    builder.body(Body::from(body)).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Audit URL from a "View logs at: ..." line.
fn audit_path(body: &str) -> String {
    let url = body
        .lines()
        .find_map(|l| l.strip_prefix("View logs at: "))
        .expect("response carries an audit link");
    url.strip_prefix(common::PUBLIC_URL).unwrap().to_string()
}

/// Read the audit log at `path` until it mentions `needle`.
async fn poll_audit(app: &Router, path: &str, needle: &str) -> String {
    let mut log = String::new();
    for _ in 0..50 {
        let (status, text) = send(app, get(path)).await;
        if status == StatusCode::OK {
            log = text;
            if log.contains(needle) {
                break;
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    log
}

#[tokio::test]
async fn webhook_requires_id() {
    let h = Harness::new().await;
    let app = router(&h);

    let (status, body) = send(&app, post("/webhook", Some("star"), None, vec![])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("missing the id parameter"));

    let (status, body) = send(&app, post("/webhook?id=nope", Some("star"), None, vec![])).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("invalid id parameter"));
}

#[tokio::test]
async fn webhook_auth_and_headers() {
    let h = Harness::new().await;
    h.destination("d1").await;
    let app = router(&h);
    let body = star_payload("octo/repo");

    let (status, _) = send(
        &app,
        post("/webhook?id=d1", Some("star"), Some("sha256=abcd"), body.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let sig = sign(&body);
    let (status, text) = send(&app, post("/webhook?id=d1", None, Some(&sig), body.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(text.contains("X-GitHub-Event"));

    let ping = br#"{"zen": "hi"}"#.to_vec();
    let sig = sign(&ping);
    let (status, text) = send(&app, post("/webhook?id=d1", Some("ping"), Some(&sig), ping)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(text, "pong");

    let junk = b"{".to_vec();
    let sig = sign(&junk);
    let (status, _) = send(&app, post("/webhook?id=d1", Some("star"), Some(&sig), junk)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn webhook_not_configured() {
    let h = Harness::new().await;
    h.destination("d1").await;
    let app = router(&h);

    let body = star_payload("octo/repo");
    let sig = sign(&body);
    let (status, text) = send(&app, post("/webhook?id=d1", Some("star"), Some(&sig), body)).await;
    assert_eq!(status, StatusCode::PARTIAL_CONTENT);
    assert_eq!(text, "This repository is not configured on hookrelay, ignoring");
}

#[tokio::test]
async fn webhook_denied_by_modifier() {
    let h = Harness::new().await;
    h.destination("d1").await;
    h.bind("d1", "octo/repo", &["c1"]).await;
    h.modifier(
        EventModifierDbModel::new("d1", vec!["push".to_string()], 0)
            .with_id("only-push")
            .whitelist(),
    )
    .await;
    let app = router(&h);

    let body = star_payload("octo/repo");
    let sig = sign(&body);
    let (status, text) = send(&app, post("/webhook?id=d1", Some("star"), Some(&sig), body)).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    // Rule evaluation happens after the response; the denial is only audited.
    let log = poll_audit(&app, &audit_path(&text), "ACL Fail").await;
    assert!(log.contains(
        "ACL Fail: acl=event_modifier only-push: whitelist-only event modifier but event not matched"
    ));
    assert!(h.sink.sent().is_empty());
}

#[tokio::test]
async fn webhook_accepted_and_audit_readable() {
    let h = Harness::new().await;
    h.destination("d1").await;
    h.bind("d1", "octo/repo", &["c1"]).await;
    let app = router(&h);

    let body = star_payload("octo/repo");
    let sig = sign(&body);
    let (status, text) = send(&app, post("/webhook?id=d1", Some("star"), Some(&sig), body)).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert!(text.starts_with("View logs at: http://relay.test/audit?log_id="));
    assert!(text.ends_with("Going to process webhook event now: star"));

    // The HTTP handler does not wait for delivery.
    let log = poll_audit(&app, &audit_path(&text), "Delivery finished").await;
    assert!(log.starts_with("Processing event: star"));
    assert!(log.contains("Delivery finished: 1/1 channels succeeded"));
    assert_eq!(h.sink.message_channels(), vec!["c1"]);
}

#[tokio::test]
async fn audit_endpoint_errors() {
    let h = Harness::new().await;
    let app = router(&h);

    let (status, text) = send(&app, get("/audit")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(text.contains("Missing log_id parameter"));

    let (status, text) = send(&app, get("/audit?log_id=unknown")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(text.contains("Error getting log"));
}

#[tokio::test]
async fn describe_destination_dump() {
    let h = Harness::new().await;
    h.destination("d1").await;
    h.bind("d1", "octo/repo", &["c1"]).await;
    let app = router(&h);

    let (status, text) = send(&app, get("/webhook?id=d1")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(text.starts_with("Comment: test destination"));
    assert!(text.contains("Repo: octo/repo"));

    let (status, _) = send(&app, get("/webhook?id=nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn informational_routes() {
    let h = Harness::new().await;
    let app = router(&h);

    let (status, text) = send(&app, get("/events")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(text.lines().any(|l| l == "- push"));

    let (status, text) = send(&app, get("/events/csv")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(text.split(',').any(|e| e == "star"));

    let (status, _) = send(&app, get("/health/ready")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, get("/")).await;
    assert_eq!(status, StatusCode::OK);
}
