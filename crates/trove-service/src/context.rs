//! Session context carrying the authenticated user.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use trove_entity::folder::Folder;
use trove_entity::user::User;

/// Context for the current authenticated session.
///
/// Established at login, carried in the signed session cookie, and
/// passed into service methods so every operation knows *who* is
/// acting. Holds no permissions: those are evaluated per request
/// against the tuple store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionContext {
    /// The user's internal database key.
    pub user_id: i64,
    /// The user's public uuid, as used in relation tuples.
    pub user_uuid: Uuid,
    /// Display name.
    pub display_name: String,
    /// Avatar image URL.
    pub avatar_url: Option<String>,
    /// The user's default folder, entry point of their workspace.
    pub default_folder_uuid: Uuid,
}

impl SessionContext {
    /// Build a context from a user row and their default folder.
    pub fn new(user: &User, default_folder: &Folder) -> Self {
        Self {
            user_id: user.id,
            user_uuid: user.uuid,
            display_name: user.display_name.clone(),
            avatar_url: user.avatar_url.clone(),
            default_folder_uuid: default_folder.uuid,
        }
    }
}
