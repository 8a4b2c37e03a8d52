//! File repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use trove_core::error::{AppError, ErrorKind};
use trove_core::result::AppResult;
use trove_entity::file::{CreateFile, File};
use trove_entity::store::FileStore;

/// Repository for file CRUD.
#[derive(Debug, Clone)]
pub struct FileRepository {
    pool: PgPool,
}

impl FileRepository {
    /// Create a new file repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileStore for FileRepository {
    async fn find_by_uuid(&self, uuid: Uuid) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>("SELECT * FROM files WHERE uuid = $1")
            .bind(uuid)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find file", e))
    }

    async fn create(&self, data: &CreateFile) -> AppResult<File> {
        sqlx::query_as::<_, File>(
            "INSERT INTO files (uuid, folder_uuid, name, text_content, creator_id) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(data.uuid)
        .bind(data.folder_uuid)
        .bind(&data.name)
        .bind(&data.text_content)
        .bind(data.creator_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create file", e))
    }

    async fn update_content(&self, uuid: Uuid, content: &str) -> AppResult<File> {
        sqlx::query_as::<_, File>(
            "UPDATE files SET text_content = $2, updated_at = NOW() \
             WHERE uuid = $1 RETURNING *",
        )
        .bind(uuid)
        .bind(content)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update file", e))?
        .ok_or_else(|| AppError::not_found("File not found"))
    }

    async fn delete_by_uuid(&self, uuid: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM files WHERE uuid = $1")
            .bind(uuid)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete file", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn files_in_folder(&self, folder_uuid: Uuid) -> AppResult<Vec<File>> {
        sqlx::query_as::<_, File>(
            "SELECT * FROM files WHERE folder_uuid = $1 ORDER BY name ASC",
        )
        .bind(folder_uuid)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list folder files", e))
    }
}
