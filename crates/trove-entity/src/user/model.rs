//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A registered user.
///
/// Users are created on first successful authentication against the
/// identity provider and are never deleted. The internal `id` is the
/// database key; `uuid` is the stable public identity used in relation
/// tuples.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Internal database key.
    pub id: i64,
    /// Stable public identity, immutable.
    pub uuid: Uuid,
    /// Email address, unique.
    pub email: String,
    /// Human-readable display name.
    pub display_name: String,
    /// Avatar image URL from the identity provider.
    pub avatar_url: Option<String>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}

/// Data required to register a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Public identity.
    pub uuid: Uuid,
    /// Email address.
    pub email: String,
    /// Display name.
    pub display_name: String,
    /// Avatar image URL.
    pub avatar_url: Option<String>,
}
