//! Folder repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use trove_core::error::{AppError, ErrorKind};
use trove_core::result::AppResult;
use trove_entity::folder::{CreateFolder, Folder};
use trove_entity::store::FolderStore;

/// Repository for folder CRUD and tree queries.
#[derive(Debug, Clone)]
pub struct FolderRepository {
    pool: PgPool,
}

impl FolderRepository {
    /// Create a new folder repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FolderStore for FolderRepository {
    async fn find_by_uuid(&self, uuid: Uuid) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE uuid = $1")
            .bind(uuid)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find folder", e))
    }

    async fn default_folder_for(&self, creator_id: i64) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE creator_id = $1 AND is_default_folder = TRUE",
        )
        .bind(creator_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find default folder", e)
        })
    }

    async fn create(&self, data: &CreateFolder) -> AppResult<Folder> {
        sqlx::query_as::<_, Folder>(
            "INSERT INTO folders (uuid, creator_id, name, is_default_folder, parent_uuid) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(data.uuid)
        .bind(data.creator_id)
        .bind(&data.name)
        .bind(data.is_default_folder)
        .bind(data.parent_uuid)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create folder", e))
    }

    async fn delete_by_uuid(&self, uuid: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM folders WHERE uuid = $1")
            .bind(uuid)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete folder", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn children_of(&self, parent_uuid: Uuid) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE parent_uuid = $1 ORDER BY name ASC",
        )
        .bind(parent_uuid)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list children", e))
    }

    async fn delete_subtree(
        &self,
        folder_uuids: &[Uuid],
        file_uuids: &[Uuid],
    ) -> AppResult<(u64, u64)> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let files = sqlx::query("DELETE FROM files WHERE uuid = ANY($1)")
            .bind(file_uuids)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete subtree files", e)
            })?;

        let folders = sqlx::query("DELETE FROM folders WHERE uuid = ANY($1)")
            .bind(folder_uuids)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete subtree folders", e)
            })?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit subtree deletion", e)
        })?;

        Ok((folders.rows_affected(), files.rows_affected()))
    }
}
