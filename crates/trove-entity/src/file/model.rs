//! File entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A text file. Always belongs to exactly one folder.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct File {
    /// Internal database key.
    pub id: i64,
    /// Stable public identity.
    pub uuid: Uuid,
    /// Public uuid of the owning folder.
    pub folder_uuid: Uuid,
    /// File name.
    pub name: String,
    /// Text content.
    pub text_content: String,
    /// Internal id of the creating user.
    pub creator_id: i64,
    /// When the file was created.
    pub created_at: DateTime<Utc>,
    /// When the file was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to create a new file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFile {
    /// Public identity.
    pub uuid: Uuid,
    /// Owning folder uuid.
    pub folder_uuid: Uuid,
    /// File name.
    pub name: String,
    /// Initial text content.
    pub text_content: String,
    /// Internal id of the creating user.
    pub creator_id: i64,
}
