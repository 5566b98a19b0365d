//! Destination repository.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::database::models::DestinationDbModel;
use crate::{Error, Result};

/// Destination repository trait.
#[async_trait]
pub trait DestinationRepository: Send + Sync {
    /// Look up a destination; `Error::NotFound` when the id is unknown.
    async fn get_destination(&self, id: &str) -> Result<DestinationDbModel>;
    async fn list_destinations(&self) -> Result<Vec<DestinationDbModel>>;
    async fn create_destination(&self, destination: &DestinationDbModel) -> Result<()>;
    async fn delete_destination(&self, id: &str) -> Result<()>;
}

/// SQLx implementation of DestinationRepository.
pub struct SqlxDestinationRepository {
    pool: SqlitePool,
}

impl SqlxDestinationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DestinationRepository for SqlxDestinationRepository {
    async fn get_destination(&self, id: &str) -> Result<DestinationDbModel> {
        sqlx::query_as::<_, DestinationDbModel>("SELECT * FROM destinations WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::not_found("Destination", id))
    }

    async fn list_destinations(&self) -> Result<Vec<DestinationDbModel>> {
        let destinations = sqlx::query_as::<_, DestinationDbModel>(
            "SELECT * FROM destinations ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(destinations)
    }

    async fn create_destination(&self, destination: &DestinationDbModel) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO destinations (id, secret, comment, guild_id, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&destination.id)
        .bind(&destination.secret)
        .bind(&destination.comment)
        .bind(&destination.guild_id)
        .bind(destination.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_destination(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM destinations WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::not_found("Destination", id));
        }
        Ok(())
    }
}
