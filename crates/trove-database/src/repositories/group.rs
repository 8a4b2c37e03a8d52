//! Group and membership repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use trove_core::error::{AppError, ErrorKind};
use trove_core::result::AppResult;
use trove_entity::group::{CreateGroup, Group, GroupMembership};
use trove_entity::store::GroupStore;
use trove_entity::user::User;

/// Repository for groups and their membership rows.
#[derive(Debug, Clone)]
pub struct GroupRepository {
    pool: PgPool,
}

impl GroupRepository {
    /// Create a new group repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GroupStore for GroupRepository {
    async fn find_by_uuid(&self, uuid: Uuid) -> AppResult<Option<Group>> {
        sqlx::query_as::<_, Group>("SELECT * FROM groups WHERE uuid = $1")
            .bind(uuid)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find group", e))
    }

    async fn create(&self, data: &CreateGroup) -> AppResult<Group> {
        sqlx::query_as::<_, Group>(
            "INSERT INTO groups (uuid, name, creator_id) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(data.uuid)
        .bind(&data.name)
        .bind(data.creator_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create group", e))
    }

    async fn delete_by_uuid(&self, uuid: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM groups WHERE uuid = $1")
            .bind(uuid)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete group", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn membership_exists(&self, user_id: i64, group_id: i64) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM group_memberships WHERE user_id = $1 AND group_id = $2)",
        )
        .bind(user_id)
        .bind(group_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to check membership", e))
    }

    async fn add_membership(&self, user_id: i64, group_id: i64) -> AppResult<GroupMembership> {
        sqlx::query_as::<_, GroupMembership>(
            "INSERT INTO group_memberships (user_id, group_id) VALUES ($1, $2) RETURNING *",
        )
        .bind(user_id)
        .bind(group_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to add membership", e))
    }

    async fn remove_membership(&self, user_id: i64, group_id: i64) -> AppResult<bool> {
        let result =
            sqlx::query("DELETE FROM group_memberships WHERE user_id = $1 AND group_id = $2")
                .bind(user_id)
                .bind(group_id)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to remove membership", e)
                })?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_members(&self, group_id: i64) -> AppResult<Vec<User>> {
        sqlx::query_as::<_, User>(
            "SELECT u.* FROM users u \
             INNER JOIN group_memberships m ON m.user_id = u.id \
             WHERE m.group_id = $1 ORDER BY u.display_name ASC",
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list members", e))
    }

    async fn search_prefix(&self, prefix: &str, limit: i64) -> AppResult<Vec<Group>> {
        sqlx::query_as::<_, Group>(
            "SELECT * FROM groups WHERE name LIKE $1 || '%' ORDER BY name ASC LIMIT $2",
        )
        .bind(prefix)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to search groups", e))
    }
}
