//! Application state shared across all handlers and extractors.

use std::sync::Arc;

use sqlx::PgPool;

use trove_core::config::AppConfig;
use trove_service::{FileService, FolderService, GroupService, ShareService, UserService};

use crate::identity::IdentityClient;
use crate::session::SessionSigner;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// PostgreSQL connection pool.
    pub db_pool: PgPool,
    /// Identity provider client.
    pub identity: IdentityClient,
    /// Session cookie signer.
    pub sessions: SessionSigner,
    /// User registration, login, directory search.
    pub user_service: Arc<UserService>,
    /// Folder tree operations.
    pub folder_service: Arc<FolderService>,
    /// File operations.
    pub file_service: Arc<FileService>,
    /// Group management.
    pub group_service: Arc<GroupService>,
    /// Share grants.
    pub share_service: Arc<ShareService>,
}

impl AppState {
    /// The callback URL registered with the identity provider.
    pub fn callback_url(&self) -> String {
        format!(
            "{}/callback",
            self.config.server.public_url.trim_end_matches('/')
        )
    }
}
