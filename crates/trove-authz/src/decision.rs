//! Action-level access decisions.
//!
//! Services express intent (`Action::Write` on a file) and this layer
//! maps it to the relation the authorization model computes. Keeping
//! the mapping in one table means a model change touches one file.

use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use trove_core::error::AppError;
use trove_core::result::AppResult;
use trove_entity::group::GroupRole;

use crate::gateway::TupleGateway;
use crate::tuple::{ObjectRef, ObjectType, Relation, SubjectRef};

/// User intents checked against the permission graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Read content or see a listing.
    Read,
    /// Modify content.
    Write,
    /// Grant access to others.
    Share,
    /// Create a file or folder inside a folder.
    CreateInside,
    /// Delete the object outright.
    Delete,
    /// Add a member to a group.
    Invite,
    /// See a group's member roster.
    ViewRoster,
}

impl Action {
    /// The relation the model computes for this action.
    fn relation(self) -> Relation {
        match self {
            Self::Read => Relation::CanRead,
            Self::Write => Relation::CanWrite,
            Self::Share => Relation::CanShare,
            Self::CreateInside => Relation::CanCreateFile,
            Self::Delete => Relation::Owner,
            Self::Invite => Relation::CanInvite,
            Self::ViewRoster => Relation::CanView,
        }
    }
}

/// Decision helper shared by all services.
#[derive(Clone)]
pub struct AccessDecider {
    gateway: Arc<TupleGateway>,
}

impl AccessDecider {
    /// Build a decider over a gateway.
    pub fn new(gateway: Arc<TupleGateway>) -> Self {
        Self { gateway }
    }

    /// The underlying gateway, for tuple writes.
    pub fn gateway(&self) -> &TupleGateway {
        &self.gateway
    }

    /// Whether the user may perform the action on the object.
    pub async fn allows(&self, user: Uuid, action: Action, object: ObjectRef) -> AppResult<bool> {
        self.gateway
            .check(SubjectRef::user(user), action.relation(), object)
            .await
    }

    /// Require the action; denial is an authorization error.
    pub async fn require(&self, user: Uuid, action: Action, object: ObjectRef) -> AppResult<()> {
        if self.allows(user, action, object).await? {
            Ok(())
        } else {
            Err(AppError::authorization(format!(
                "Not permitted: {action:?} on {object}"
            )))
        }
    }

    /// Every object of a type the user can read, as a uuid set for
    /// intersection with entity rows.
    pub async fn readable(&self, user: Uuid, object_type: ObjectType) -> AppResult<HashSet<Uuid>> {
        let objects = self
            .gateway
            .list_accessible(SubjectRef::user(user), Relation::CanRead, object_type)
            .await?;
        Ok(objects.into_iter().map(|o| o.id).collect())
    }

    /// The user's strongest role in a group, probing in precedence
    /// order. Owner is not a member unless a member tuple also exists,
    /// but it still outranks the roster.
    pub async fn effective_group_role(
        &self,
        user: Uuid,
        group: Uuid,
    ) -> AppResult<Option<GroupRole>> {
        let subject = SubjectRef::user(user);
        let object = ObjectRef::group(group);

        for (relation, role) in [
            (Relation::Owner, GroupRole::Owner),
            (Relation::Admin, GroupRole::Admin),
            (Relation::Member, GroupRole::Member),
        ] {
            if self.gateway.check(subject, relation, object).await? {
                return Ok(Some(role));
            }
        }
        Ok(None)
    }
}
