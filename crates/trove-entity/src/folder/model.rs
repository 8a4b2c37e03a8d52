//! Folder entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A folder in the workspace tree.
///
/// Following `parent_uuid` links from any folder terminates at a folder
/// with no parent. The default folder is created at registration, is the
/// only folder with `is_default_folder = true` per user, never has a
/// parent, and can never be deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Folder {
    /// Internal database key.
    pub id: i64,
    /// Stable public identity.
    pub uuid: Uuid,
    /// Internal id of the creating user.
    pub creator_id: i64,
    /// Folder name.
    pub name: String,
    /// Whether this is the user's permanent root folder.
    pub is_default_folder: bool,
    /// Public uuid of the parent folder (None only for roots).
    pub parent_uuid: Option<Uuid>,
    /// When the folder was created.
    pub created_at: DateTime<Utc>,
    /// When the folder was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Folder {
    /// Check if this is a root folder (no parent).
    pub fn is_root(&self) -> bool {
        self.parent_uuid.is_none()
    }
}

/// Data required to create a new folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolder {
    /// Public identity.
    pub uuid: Uuid,
    /// Internal id of the creating user.
    pub creator_id: i64,
    /// Folder name.
    pub name: String,
    /// Whether this is the user's permanent root folder.
    pub is_default_folder: bool,
    /// Parent folder uuid (None for roots).
    pub parent_uuid: Option<Uuid>,
}
