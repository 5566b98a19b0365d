//! Audit log repository.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::database::models::AuditEntryDbModel;
use crate::database::time::now_ms;
use crate::{Error, Result};

/// Append-only audit storage.
#[async_trait]
pub trait AuditRepository: Send + Sync {
    /// Append `lines` to `log_id`, creating the entry on first use.
    ///
    /// `destination_id` and `context_id` are only recorded on creation.
    async fn append_lines(
        &self,
        log_id: &str,
        destination_id: &str,
        context_id: &str,
        lines: &[String],
    ) -> Result<()>;

    async fn get_entry(&self, log_id: &str) -> Result<AuditEntryDbModel>;

    /// Ordered lines of an entry; `Error::NotFound` when the entry is absent.
    async fn get_lines(&self, log_id: &str) -> Result<Vec<String>>;

    /// Delete entries created before `cutoff_ms`. Returns the number removed.
    async fn delete_older_than(&self, cutoff_ms: i64) -> Result<u64>;
}

/// SQLx implementation of AuditRepository.
pub struct SqlxAuditRepository {
    pool: SqlitePool,
}

impl SqlxAuditRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditRepository for SqlxAuditRepository {
    async fn append_lines(
        &self,
        log_id: &str,
        destination_id: &str,
        context_id: &str,
        lines: &[String],
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        // Write first so the transaction takes the write lock up front.
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO audit_entries (log_id, destination_id, context_id, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(log_id)
        .bind(destination_id)
        .bind(context_id)
        .bind(now_ms())
        .execute(&mut *tx)
        .await?;

        let next_seq: i64 =
            sqlx::query_scalar("SELECT COALESCE(MAX(seq) + 1, 0) FROM audit_lines WHERE log_id = ?")
                .bind(log_id)
                .fetch_one(&mut *tx)
                .await?;

        for (offset, line) in lines.iter().enumerate() {
            sqlx::query("INSERT INTO audit_lines (log_id, seq, line) VALUES (?, ?, ?)")
                .bind(log_id)
                .bind(next_seq + offset as i64)
                .bind(line)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn get_entry(&self, log_id: &str) -> Result<AuditEntryDbModel> {
        sqlx::query_as::<_, AuditEntryDbModel>("SELECT * FROM audit_entries WHERE log_id = ?")
            .bind(log_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::not_found("AuditEntry", log_id))
    }

    async fn get_lines(&self, log_id: &str) -> Result<Vec<String>> {
        // Existence check distinguishes "unknown id" from "no lines yet".
        self.get_entry(log_id).await?;

        let lines: Vec<String> =
            sqlx::query_scalar("SELECT line FROM audit_lines WHERE log_id = ? ORDER BY seq")
                .bind(log_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(lines)
    }

    async fn delete_older_than(&self, cutoff_ms: i64) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"
            DELETE FROM audit_lines WHERE log_id IN (
                SELECT log_id FROM audit_entries WHERE created_at < ?
            )
            "#,
        )
        .bind(cutoff_ms)
        .execute(&mut *tx)
        .await?;
        let result = sqlx::query("DELETE FROM audit_entries WHERE created_at < ?")
            .bind(cutoff_ms)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected())
    }
}
