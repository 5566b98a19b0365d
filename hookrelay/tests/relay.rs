//! End-to-end runs of the relay pipeline against an in-memory database.

mod common;

use std::sync::atomic::Ordering;
use std::time::Duration;

use common::{Harness, RecordingSink, Sent, sign, star_payload};
use hookrelay::database::models::EventModifierDbModel;
use hookrelay::modifiers::AclCause;
use hookrelay::relay::{InboundWebhook, ProcessingReport, RelayError, RelayOutcome};

fn request<'a>(
    destination: &'a str,
    event: &'a str,
    signature: &'a str,
    body: &'a [u8],
) -> InboundWebhook<'a> {
    InboundWebhook {
        destination_id: destination,
        event: Some(event),
        signature: Some(signature),
        body,
    }
}

/// Wait for the background work of an accepted event.
async fn settle(outcome: RelayOutcome) -> (String, ProcessingReport) {
    match outcome {
        RelayOutcome::Accepted {
            log_id, processing, ..
        } => (log_id, processing.await.unwrap()),
        other => panic!("expected Accepted, got {other:?}"),
    }
}

async fn accept(outcome: RelayOutcome) -> (String, Vec<hookrelay::delivery::DeliveryOutcome>) {
    match settle(outcome).await {
        (log_id, ProcessingReport::Delivered(outcomes)) => (log_id, outcomes),
        (_, other) => panic!("expected Delivered, got {other:?}"),
    }
}

#[tokio::test]
async fn star_is_delivered_to_bound_channels() {
    let h = Harness::new().await;
    h.destination("d1").await;
    h.bind("d1", "Octo/Repo", &["c1", "c2"]).await;

    let body = star_payload("octo/repo");
    let sig = sign(&body);
    let outcome = h
        .container
        .relay
        .handle(request("d1", "star", &sig, &body))
        .await
        .unwrap();
    let (log_id, outcomes) = accept(outcome).await;

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|o| o.is_success()));
    assert_eq!(h.sink.message_channels(), vec!["c1", "c2"]);
    assert!(matches!(
        &h.sink.sent()[0],
        Sent::Message { title, .. } if title == "Starred: octo/repo"
    ));

    let lines = h.container.relay.audit().lines(&log_id).await.unwrap();
    assert!(lines[0].starts_with("Processing event: star repoName=octo/repo webhookID=d1"));
    assert!(lines.contains(&"SUCCESS: This event can be personalized".to_string()));
    assert!(lines.contains(&"Sending event to channel: channelId=c2".to_string()));
    assert_eq!(
        lines.last().map(String::as_str),
        Some("Delivery finished: 2/2 channels succeeded")
    );
}

#[tokio::test]
async fn unknown_destination_and_bad_signature() {
    let h = Harness::new().await;
    h.destination("d1").await;
    let body = star_payload("octo/repo");
    let sig = sign(&body);

    let err = h
        .container
        .relay
        .handle(request("nope", "star", &sig, &body))
        .await
        .unwrap_err();
    assert!(matches!(err, RelayError::UnknownDestination));

    let err = h
        .container
        .relay
        .handle(request("d1", "star", "sha256=00", &body))
        .await
        .unwrap_err();
    assert!(matches!(err, RelayError::BadSignature));

    let err = h
        .container
        .relay
        .handle(InboundWebhook {
            signature: None,
            ..request("d1", "star", "", &body)
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RelayError::BadSignature));
    assert!(h.sink.sent().is_empty());
}

#[tokio::test]
async fn ping_and_missing_event() {
    let h = Harness::new().await;
    h.destination("d1").await;
    let body = br#"{"zen": "Keep it logically awesome."}"#;
    let sig = sign(body);

    let outcome = h
        .container
        .relay
        .handle(request("d1", "ping", &sig, body))
        .await
        .unwrap();
    assert!(matches!(outcome, RelayOutcome::Pong));

    let err = h
        .container
        .relay
        .handle(InboundWebhook {
            event: None,
            ..request("d1", "", &sig, body)
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RelayError::MissingEvent));
}

#[tokio::test]
async fn unbound_repository_is_not_configured() {
    let h = Harness::new().await;
    h.destination("d1").await;
    h.bind("d1", "octo/other", &["c1"]).await;

    let body = star_payload("octo/repo");
    let sig = sign(&body);
    let outcome = h
        .container
        .relay
        .handle(request("d1", "star", &sig, &body))
        .await
        .unwrap();
    assert!(matches!(outcome, RelayOutcome::NotConfigured));
    assert!(h.sink.sent().is_empty());
}

#[tokio::test]
async fn invalid_json_is_rejected() {
    let h = Harness::new().await;
    h.destination("d1").await;
    let body = b"not json";
    let sig = sign(body);
    let err = h
        .container
        .relay
        .handle(request("d1", "star", &sig, body))
        .await
        .unwrap_err();
    assert!(matches!(err, RelayError::InvalidJson(_)));
}

#[tokio::test]
async fn blacklisted_event_is_denied_and_audited() {
    let h = Harness::new().await;
    h.destination("d1").await;
    h.bind("d1", "octo/repo", &["c1"]).await;
    h.modifier(
        EventModifierDbModel::new("d1", vec!["star.*".to_string()], 0)
            .with_id("m1")
            .blacklist(),
    )
    .await;

    let body = star_payload("octo/repo");
    let sig = sign(&body);
    let outcome = h
        .container
        .relay
        .handle(request("d1", "star", &sig, &body))
        .await
        .unwrap();

    let (log_id, report) = settle(outcome).await;
    let ProcessingReport::Denied(failure) = report else {
        panic!("expected Denied, got {report:?}");
    };
    assert_eq!(failure.modifier_id, "m1");
    assert_eq!(failure.cause, AclCause::Blacklisted);
    assert!(h.sink.sent().is_empty());

    let lines = h.container.relay.audit().lines(&log_id).await.unwrap();
    assert!(lines.iter().any(|l| l.starts_with("ACL Fail: acl=event_modifier m1")));
}

#[tokio::test]
async fn redirect_overrides_bound_channels() {
    let h = Harness::new().await;
    h.destination("d1").await;
    let binding = h.bind("d1", "octo/repo", &["c1", "c2"]).await;
    h.modifier(
        EventModifierDbModel::new("d1", vec!["star.*".to_string()], 0)
            .for_repo(binding)
            .redirect("c9"),
    )
    .await;

    let body = star_payload("octo/repo");
    let sig = sign(&body);
    let outcome = h
        .container
        .relay
        .handle(request("d1", "star", &sig, &body))
        .await
        .unwrap();
    let (_, outcomes) = accept(outcome).await;

    assert_eq!(outcomes.len(), 1);
    assert_eq!(h.sink.message_channels(), vec!["c9"]);
}

#[tokio::test]
async fn empty_channel_list_skips_delivery() {
    let h = Harness::new().await;
    h.destination("d1").await;
    h.bind("d1", "octo/repo", &[]).await;

    let body = star_payload("octo/repo");
    let sig = sign(&body);
    let outcome = h
        .container
        .relay
        .handle(request("d1", "star", &sig, &body))
        .await
        .unwrap();
    let (log_id, outcomes) = accept(outcome).await;

    assert!(outcomes.is_empty());
    assert!(h.sink.sent().is_empty());
    let lines = h.container.relay.audit().lines(&log_id).await.unwrap();
    assert_eq!(
        lines.last().map(String::as_str),
        Some("No channels to deliver to, skipping")
    );
}

#[tokio::test]
async fn render_failure_is_audited() {
    let h = Harness::new().await;
    h.destination("d1").await;
    h.bind("d1", "octo/repo", &["c1"]).await;

    // Missing `issue` and `sender`.
    let body = br#"{"action": "opened", "repository": {"full_name": "octo/repo"}}"#;
    let sig = sign(body);
    let outcome = h
        .container
        .relay
        .handle(request("d1", "issues", &sig, body))
        .await
        .unwrap();

    let (log_id, report) = settle(outcome).await;
    assert!(matches!(report, ProcessingReport::RenderFailed(_)));
    let lines = h.container.relay.audit().lines(&log_id).await.unwrap();
    assert!(lines.iter().any(|l| l.starts_with("Error processing event: invalid issues payload")));
    assert!(h.sink.sent().is_empty());
    assert_eq!(h.container.relay.gate().active(), 0);
}

#[tokio::test]
async fn failed_channel_does_not_stop_the_others() {
    let h = Harness::with_sink(RecordingSink::failing(&["c1"])).await;
    h.destination("d1").await;
    h.bind("d1", "octo/repo", &["c1", "c2"]).await;

    let body = star_payload("octo/repo");
    let sig = sign(&body);
    let outcome = h
        .container
        .relay
        .handle(request("d1", "star", &sig, &body))
        .await
        .unwrap();
    let (log_id, outcomes) = accept(outcome).await;

    assert!(!outcomes[0].is_success());
    assert!(outcomes[1].is_success());
    assert_eq!(h.sink.message_channels(), vec!["c2"]);
    assert!(h.sink.sent().iter().any(|s| matches!(
        s,
        Sent::Text { channel_id, content }
            if channel_id == "c1" && content.starts_with("Could not send event star to channel: <#c1>")
    )));

    let lines = h.container.relay.audit().lines(&log_id).await.unwrap();
    assert!(lines.iter().any(|l| l.starts_with("Could not send event star to channel: channelId=c1 err=")));
    assert_eq!(
        lines.last().map(String::as_str),
        Some("Delivery finished: 1/2 channels succeeded")
    );
}

#[tokio::test]
async fn same_destination_deliveries_are_serialized() {
    let h = Harness::with_sink(RecordingSink::slow(Duration::from_millis(30))).await;
    h.destination("d1").await;
    h.bind("d1", "octo/repo", &["c1"]).await;

    let body = star_payload("octo/repo");
    let sig = sign(&body);
    let relay = h.container.relay.clone();

    let (a, b, c) = tokio::join!(
        relay.handle(request("d1", "star", &sig, &body)),
        relay.handle(request("d1", "star", &sig, &body)),
        relay.handle(request("d1", "star", &sig, &body)),
    );
    for outcome in [a, b, c] {
        accept(outcome.unwrap()).await;
    }

    assert_eq!(h.sink.message_channels().len(), 3);
    assert_eq!(h.sink.max_in_flight.load(Ordering::SeqCst), 1);
    assert_eq!(relay.gate().active(), 0);
}

#[tokio::test]
async fn second_event_is_accepted_while_first_is_delivering() {
    let h = Harness::with_sink(RecordingSink::held()).await;
    h.destination("d1").await;
    h.bind("d1", "octo/repo", &["c1"]).await;

    let body = star_payload("octo/repo");
    let sig = sign(&body);
    let relay = h.container.relay.clone();

    let first = relay.handle(request("d1", "star", &sig, &body)).await.unwrap();
    tokio::time::timeout(Duration::from_secs(5), async {
        while h.sink.in_flight() == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("first delivery never started");

    // The gate for d1 is held by the first delivery.
    let second = tokio::time::timeout(
        Duration::from_secs(1),
        relay.handle(request("d1", "star", &sig, &body)),
    )
    .await
    .expect("handle waited on the destination gate")
    .unwrap();
    assert!(matches!(second, RelayOutcome::Accepted { .. }));
    assert!(h.sink.sent().is_empty());

    h.sink.release();
    accept(first).await;
    accept(second).await;

    assert_eq!(h.sink.message_channels().len(), 2);
    assert_eq!(h.sink.max_in_flight.load(Ordering::SeqCst), 1);
    assert_eq!(relay.gate().active(), 0);
}

#[tokio::test]
async fn null_repository_is_not_configured() {
    let h = Harness::new().await;
    h.destination("d1").await;
    h.bind("d1", "octo/repo", &["c1"]).await;

    let body = br#"{"action": "created", "repository": null}"#;
    let sig = sign(body);
    let outcome = h
        .container
        .relay
        .handle(request("d1", "star", &sig, body))
        .await
        .unwrap();
    assert!(matches!(outcome, RelayOutcome::NotConfigured));
}
