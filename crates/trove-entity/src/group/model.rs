//! Group entity model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A sharing group.
///
/// The creator becomes both owner and implicit member; both facts are
/// written explicitly to the authorization store because owner does not
/// imply member in the tuple graph.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Group {
    /// Internal database key.
    pub id: i64,
    /// Stable public identity.
    pub uuid: Uuid,
    /// Group name.
    pub name: String,
    /// Internal id of the creating user.
    pub creator_id: i64,
}

/// Data required to create a group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGroup {
    /// Public identity.
    pub uuid: Uuid,
    /// Group name.
    pub name: String,
    /// Internal id of the creating user.
    pub creator_id: i64,
}

/// Membership join row.
///
/// A row exists iff a corresponding `member` tuple exists in the
/// authorization store; the row is what makes duplicate invites
/// detectable.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GroupMembership {
    /// Internal database key.
    pub id: i64,
    /// Internal id of the member user.
    pub user_id: i64,
    /// Internal id of the group.
    pub group_id: i64,
}
