//! Per-request audit trail.
//!
//! Each accepted webhook gets a log id; every pipeline decision is appended
//! under it and can be read back from `/audit?log_id=`. Writes never fail the
//! pipeline: storage errors are logged and dropped.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::Result;
use crate::database::repositories::AuditRepository;
use crate::database::time::days_ago_ms;

/// How often the retention task runs.
const RETENTION_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Identifies the audit entry a pipeline run writes to.
#[derive(Debug, Clone)]
pub struct AuditContext {
    pub log_id: String,
    pub destination_id: String,
    pub context_id: String,
}

impl AuditContext {
    /// Fresh context with a new random log id.
    pub fn new(destination_id: impl Into<String>, context_id: impl Into<String>) -> Self {
        Self {
            log_id: uuid::Uuid::new_v4().simple().to_string(),
            destination_id: destination_id.into(),
            context_id: context_id.into(),
        }
    }
}

#[derive(Clone)]
pub struct AuditLog {
    repo: Arc<dyn AuditRepository>,
}

impl AuditLog {
    pub fn new(repo: Arc<dyn AuditRepository>) -> Self {
        Self { repo }
    }

    /// Append lines in order. Failures are logged, not returned.
    pub async fn append<I, S>(&self, ctx: &AuditContext, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let lines: Vec<String> = lines.into_iter().map(Into::into).collect();
        if lines.is_empty() {
            return;
        }
        if let Err(e) = self
            .repo
            .append_lines(&ctx.log_id, &ctx.destination_id, &ctx.context_id, &lines)
            .await
        {
            warn!(
                log_id = %ctx.log_id,
                destination_id = %ctx.destination_id,
                error = %e,
                "Failed to write audit lines"
            );
        }
    }

    /// Ordered lines of `log_id`; `Error::NotFound` when unknown.
    pub async fn lines(&self, log_id: &str) -> Result<Vec<String>> {
        self.repo.get_lines(log_id).await
    }

    /// Delete entries older than `days` days.
    pub async fn purge_older_than(&self, days: u32) -> Result<u64> {
        let removed = self.repo.delete_older_than(days_ago_ms(days)).await?;
        if removed > 0 {
            info!(removed, days, "Purged expired audit entries");
        }
        Ok(removed)
    }

    /// Purge entries older than `days` once now and then daily until
    /// `cancel` fires. `days == 0` keeps entries forever.
    pub fn spawn_retention_task(
        &self,
        days: u32,
        cancel: CancellationToken,
    ) -> Option<tokio::task::JoinHandle<()>> {
        if days == 0 {
            debug!("Audit retention disabled");
            return None;
        }
        let audit = self.clone();
        Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(RETENTION_INTERVAL);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        debug!("Audit retention task stopped");
                        break;
                    }
                    _ = interval.tick() => {
                        if let Err(e) = audit.purge_older_than(days).await {
                            warn!(error = %e, "Audit retention pass failed");
                        }
                    }
                }
            }
        }))
    }
}
