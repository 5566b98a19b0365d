//! Shared fixtures: an in-memory database and a recording chat sink.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use gh_render::NotificationMessage;
use hookrelay::database::models::{DestinationDbModel, EventModifierDbModel, RepoBindingDbModel};
use hookrelay::database::repositories::{
    DestinationRepository, EventModifierRepository, RepoBindingRepository,
};
use hookrelay::database::{self, DbPool};
use hookrelay::delivery::ChatSink;
use hookrelay::services::ServiceContainer;
use hookrelay::webhook::{compute_signature, format_signature_header};

pub const SECRET: &str = "s3cret";
pub const PUBLIC_URL: &str = "http://relay.test";

/// What a sink call received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Message { channel_id: String, title: String },
    Text { channel_id: String, content: String },
}

/// Sink that records every call. Embeds to `failing` channels are refused;
/// plain-text notices always go through.
#[derive(Default)]
pub struct RecordingSink {
    pub sent: Mutex<Vec<Sent>>,
    failing: HashSet<String>,
    delay: Option<Duration>,
    hold: Option<Semaphore>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl RecordingSink {
    pub fn failing(channels: &[&str]) -> Self {
        Self {
            failing: channels.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Default::default()
        }
    }

    /// Embeds block until [`RecordingSink::release`] is called.
    pub fn held() -> Self {
        Self {
            hold: Some(Semaphore::new(0)),
            ..Default::default()
        }
    }

    pub fn release(&self) {
        if let Some(hold) = &self.hold {
            hold.close();
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn message_channels(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Message { channel_id, .. } => Some(channel_id),
                Sent::Text { .. } => None,
            })
            .collect()
    }
}

#[async_trait]
impl ChatSink for RecordingSink {
    async fn send_message(
        &self,
        channel_id: &str,
        message: &NotificationMessage,
    ) -> hookrelay::Result<()> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(hold) = &self.hold {
            // Closed on release; the error is the wake-up.
            let _ = hold.acquire().await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(channel_id) {
            return Err(hookrelay::Error::delivery("Missing Access"));
        }
        self.sent.lock().unwrap().push(Sent::Message {
            channel_id: channel_id.to_string(),
            title: message.title.clone(),
        });
        Ok(())
    }

    async fn send_text(&self, channel_id: &str, content: &str) -> hookrelay::Result<()> {
        self.sent.lock().unwrap().push(Sent::Text {
            channel_id: channel_id.to_string(),
            content: content.to_string(),
        });
        Ok(())
    }
}

pub struct Harness {
    pub container: ServiceContainer,
    pub sink: Arc<RecordingSink>,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_sink(RecordingSink::default()).await
    }

    pub async fn with_sink(sink: RecordingSink) -> Self {
        let pool = pool().await;
        let sink = Arc::new(sink);
        let container = ServiceContainer::with_sink(pool, sink.clone(), PUBLIC_URL);
        Self { container, sink }
    }

    pub fn pool(&self) -> &DbPool {
        &self.container.pool
    }

    /// Destination `id` with [`SECRET`].
    pub async fn destination(&self, id: &str) {
        let destination = DestinationDbModel::new(SECRET, "test destination").with_id(id);
        self.container
            .relay
            .stores()
            .destinations
            .create_destination(&destination)
            .await
            .unwrap();
    }

    /// Bind `repo` to `destination`; returns the binding id.
    pub async fn bind(&self, destination: &str, repo: &str, channels: &[&str]) -> String {
        let binding = RepoBindingDbModel::new(
            destination,
            repo,
            channels.iter().map(|c| c.to_string()).collect(),
        );
        self.container
            .relay
            .stores()
            .bindings
            .create_binding(&binding)
            .await
            .unwrap();
        binding.id
    }

    pub async fn modifier(&self, modifier: EventModifierDbModel) {
        self.container
            .relay
            .stores()
            .modifiers
            .create_modifier(&modifier)
            .await
            .unwrap();
    }
}

pub async fn pool() -> DbPool {
    let pool = database::init_pool("sqlite::memory:").await.unwrap();
    database::run_migrations(&pool).await.unwrap();
    pool
}

pub fn sign(body: &[u8]) -> String {
    format_signature_header(&compute_signature(body, SECRET.as_bytes()))
}

pub fn star_payload(repo: &str) -> Vec<u8> {
    serde_json::json!({
        "action": "created",
        "repository": {"full_name": repo, "html_url": format!("https://github.com/{repo}")},
        "sender": {"login": "octocat", "html_url": "https://github.com/octocat"}
    })
    .to_string()
    .into_bytes()
}
