//! Repository binding repository.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::Result;
use crate::database::models::RepoBindingDbModel;

/// Repository binding trait.
#[async_trait]
pub trait RepoBindingRepository: Send + Sync {
    /// Find the binding for `repo_name` under a destination.
    ///
    /// The name is matched case-insensitively (bindings store it lower-cased).
    async fn find_binding(
        &self,
        destination_id: &str,
        repo_name: &str,
    ) -> Result<Option<RepoBindingDbModel>>;

    /// All bindings of a destination, oldest first.
    async fn list_bindings(&self, destination_id: &str) -> Result<Vec<RepoBindingDbModel>>;

    async fn create_binding(&self, binding: &RepoBindingDbModel) -> Result<()>;
}

/// SQLx implementation of RepoBindingRepository.
pub struct SqlxRepoBindingRepository {
    pool: SqlitePool,
}

impl SqlxRepoBindingRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RepoBindingRepository for SqlxRepoBindingRepository {
    async fn find_binding(
        &self,
        destination_id: &str,
        repo_name: &str,
    ) -> Result<Option<RepoBindingDbModel>> {
        let binding = sqlx::query_as::<_, RepoBindingDbModel>(
            "SELECT * FROM repo_bindings WHERE destination_id = ? AND repo_name = ?",
        )
        .bind(destination_id)
        .bind(repo_name.to_lowercase())
        .fetch_optional(&self.pool)
        .await?;
        Ok(binding)
    }

    async fn list_bindings(&self, destination_id: &str) -> Result<Vec<RepoBindingDbModel>> {
        let bindings = sqlx::query_as::<_, RepoBindingDbModel>(
            "SELECT * FROM repo_bindings WHERE destination_id = ? ORDER BY created_at, id",
        )
        .bind(destination_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(bindings)
    }

    async fn create_binding(&self, binding: &RepoBindingDbModel) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO repo_bindings (
                id, destination_id, repo_name, channel_ids, created_by, created_at
            ) VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&binding.id)
        .bind(&binding.destination_id)
        .bind(binding.repo_name.to_lowercase())
        .bind(&binding.channel_ids)
        .bind(&binding.created_by)
        .bind(binding.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
