//! Entity-store contracts.
//!
//! The services operate against these traits rather than a concrete
//! database so the orchestration logic can be exercised with an
//! in-memory store in tests. `trove-database` provides the PostgreSQL
//! implementations.

use async_trait::async_trait;
use uuid::Uuid;

use trove_core::result::AppResult;

use crate::file::{CreateFile, File};
use crate::folder::{CreateFolder, Folder};
use crate::group::{CreateGroup, Group, GroupMembership};
use crate::user::{CreateUser, User};

/// Store operations for users.
#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    /// Find a user by internal id.
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>>;

    /// Find a user by public uuid.
    async fn find_by_uuid(&self, uuid: Uuid) -> AppResult<Option<User>>;

    /// Find a user by email.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Insert a new user row.
    async fn create(&self, data: &CreateUser) -> AppResult<User>;

    /// Case-sensitive prefix search on display name, capped at `limit`.
    async fn search_prefix(&self, prefix: &str, limit: i64) -> AppResult<Vec<User>>;
}

/// Store operations for groups and memberships.
#[async_trait]
pub trait GroupStore: Send + Sync + 'static {
    /// Find a group by public uuid.
    async fn find_by_uuid(&self, uuid: Uuid) -> AppResult<Option<Group>>;

    /// Insert a new group row.
    async fn create(&self, data: &CreateGroup) -> AppResult<Group>;

    /// Delete a group row (compensation path). Returns `true` if a row
    /// was removed.
    async fn delete_by_uuid(&self, uuid: Uuid) -> AppResult<bool>;

    /// Whether a membership row exists for (user, group).
    async fn membership_exists(&self, user_id: i64, group_id: i64) -> AppResult<bool>;

    /// Insert a membership row.
    async fn add_membership(&self, user_id: i64, group_id: i64) -> AppResult<GroupMembership>;

    /// Remove a membership row (compensation path). Returns `true` if a
    /// row was removed.
    async fn remove_membership(&self, user_id: i64, group_id: i64) -> AppResult<bool>;

    /// List all member users of a group.
    async fn list_members(&self, group_id: i64) -> AppResult<Vec<User>>;

    /// Case-sensitive prefix search on group name, capped at `limit`.
    async fn search_prefix(&self, prefix: &str, limit: i64) -> AppResult<Vec<Group>>;
}

/// Store operations for folders, including subtree removal.
#[async_trait]
pub trait FolderStore: Send + Sync + 'static {
    /// Find a folder by public uuid.
    async fn find_by_uuid(&self, uuid: Uuid) -> AppResult<Option<Folder>>;

    /// The user's default folder, if already created.
    async fn default_folder_for(&self, creator_id: i64) -> AppResult<Option<Folder>>;

    /// Insert a new folder row.
    async fn create(&self, data: &CreateFolder) -> AppResult<Folder>;

    /// Delete a single folder row (compensation path). Returns `true` if
    /// a row was removed.
    async fn delete_by_uuid(&self, uuid: Uuid) -> AppResult<bool>;

    /// Direct child folders of a folder.
    async fn children_of(&self, parent_uuid: Uuid) -> AppResult<Vec<Folder>>;

    /// Delete a collected set of folders and files in one transaction.
    /// Returns `(folders_removed, files_removed)`.
    async fn delete_subtree(
        &self,
        folder_uuids: &[Uuid],
        file_uuids: &[Uuid],
    ) -> AppResult<(u64, u64)>;
}

/// Store operations for files.
#[async_trait]
pub trait FileStore: Send + Sync + 'static {
    /// Find a file by public uuid.
    async fn find_by_uuid(&self, uuid: Uuid) -> AppResult<Option<File>>;

    /// Insert a new file row.
    async fn create(&self, data: &CreateFile) -> AppResult<File>;

    /// Replace a file's text content. Returns the updated row.
    async fn update_content(&self, uuid: Uuid, content: &str) -> AppResult<File>;

    /// Delete a file row. Returns `true` if a row was removed.
    async fn delete_by_uuid(&self, uuid: Uuid) -> AppResult<bool>;

    /// Files directly inside a folder.
    async fn files_in_folder(&self, folder_uuid: Uuid) -> AppResult<Vec<File>>;
}

/// Ledger for authorization tuples that could not be deleted after their
/// entities were removed. A reconciliation sweep drains this table.
#[async_trait]
pub trait RepairStore: Send + Sync + 'static {
    /// Record tuples (in `subject relation object` text form) left behind
    /// by a partially failed cleanup.
    async fn record_orphans(&self, tuples: &[String]) -> AppResult<()>;
}
