//! Event modifier repository.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::Result;
use crate::database::models::EventModifierDbModel;

/// Event modifier repository trait.
#[async_trait]
pub trait EventModifierRepository: Send + Sync {
    /// All rules of a destination, global and repo-scoped, in evaluation
    /// order: priority descending, then creation time and id ascending.
    async fn list_modifiers(&self, destination_id: &str) -> Result<Vec<EventModifierDbModel>>;

    async fn create_modifier(&self, modifier: &EventModifierDbModel) -> Result<()>;
}

/// SQLx implementation of EventModifierRepository.
pub struct SqlxEventModifierRepository {
    pool: SqlitePool,
}

impl SqlxEventModifierRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventModifierRepository for SqlxEventModifierRepository {
    async fn list_modifiers(&self, destination_id: &str) -> Result<Vec<EventModifierDbModel>> {
        let modifiers = sqlx::query_as::<_, EventModifierDbModel>(
            r#"
            SELECT * FROM event_modifiers
            WHERE destination_id = ?
            ORDER BY priority DESC, created_at ASC, id ASC
            "#,
        )
        .bind(destination_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(modifiers)
    }

    async fn create_modifier(&self, modifier: &EventModifierDbModel) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO event_modifiers (
                id, destination_id, repo_id, events, blacklisted, whitelisted,
                redirect_channel, priority, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&modifier.id)
        .bind(&modifier.destination_id)
        .bind(&modifier.repo_id)
        .bind(&modifier.events)
        .bind(modifier.blacklisted)
        .bind(modifier.whitelisted)
        .bind(&modifier.redirect_channel)
        .bind(modifier.priority)
        .bind(modifier.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
