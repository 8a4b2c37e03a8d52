//! Group creation, membership management, and roster display.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use trove_authz::tuple::{ObjectRef, Relation, SubjectRef};
use trove_authz::{AccessDecider, Action};
use trove_core::error::{AppError, ErrorKind};
use trove_core::result::AppResult;
use trove_entity::group::{CreateGroup, Group, GroupRole};
use trove_entity::store::{GroupStore, UserStore};

use crate::context::SessionContext;

/// One member row of a group roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterEntry {
    /// The member's public uuid.
    pub uuid: Uuid,
    /// Display name.
    pub display_name: String,
    /// Strongest role held on the group.
    pub role: GroupRole,
}

/// A group and its visible roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupRoster {
    /// The group.
    pub group: Group,
    /// Members with their effective roles.
    pub members: Vec<RosterEntry>,
}

/// Manages sharing groups.
pub struct GroupService {
    groups: Arc<dyn GroupStore>,
    users: Arc<dyn UserStore>,
    decider: AccessDecider,
}

impl GroupService {
    /// Creates a new group service.
    pub fn new(
        groups: Arc<dyn GroupStore>,
        users: Arc<dyn UserStore>,
        decider: AccessDecider,
    ) -> Self {
        Self {
            groups,
            users,
            decider,
        }
    }

    async fn load_group(&self, uuid: Uuid) -> AppResult<Group> {
        self.groups
            .find_by_uuid(uuid)
            .await?
            .ok_or_else(|| AppError::not_found("Group not found"))
    }

    /// Create a group. Rows first (group, then the creator's membership),
    /// tuples second; the creator becomes owner and member, and both
    /// tuples are written explicitly because owner does not imply
    /// member in the tuple graph. Any failure unwinds what was written.
    pub async fn create_group(&self, ctx: &SessionContext, name: &str) -> AppResult<Group> {
        if name.trim().is_empty() {
            return Err(AppError::validation("Group name must not be empty"));
        }

        let group = self
            .groups
            .create(&CreateGroup {
                uuid: Uuid::new_v4(),
                name: name.to_string(),
                creator_id: ctx.user_id,
            })
            .await?;

        if let Err(err) = self.groups.add_membership(ctx.user_id, group.id).await {
            if !self.groups.delete_by_uuid(group.uuid).await? {
                warn!(group = %group.uuid, "Compensation delete removed no group row");
            }
            return Err(err);
        }

        let subject = SubjectRef::user(ctx.user_uuid);
        let object = ObjectRef::group(group.uuid);
        let tuples = async {
            self.decider
                .gateway()
                .relate(subject, Relation::Owner, object)
                .await?;
            self.decider
                .gateway()
                .relate(subject, Relation::Member, object)
                .await
        };
        if let Err(err) = tuples.await {
            self.unwind_created_group(ctx, &group, subject, object).await;
            return Err(err);
        }

        info!(group = %group.uuid, "Group created");
        Ok(group)
    }

    /// Best-effort rollback of a group creation whose tuple writes
    /// failed: drop whichever tuples landed, then the membership row,
    /// then the group row.
    async fn unwind_created_group(
        &self,
        ctx: &SessionContext,
        group: &Group,
        subject: SubjectRef,
        object: ObjectRef,
    ) {
        for relation in [Relation::Owner, Relation::Member] {
            match self.decider.gateway().unrelate(subject, relation, object).await {
                Ok(()) => {}
                Err(err) if err.kind == ErrorKind::NotFound => {}
                Err(err) => {
                    warn!(group = %group.uuid, ?relation, error = %err, "Compensation tuple delete failed");
                }
            }
        }
        if let Err(err) = self.groups.remove_membership(ctx.user_id, group.id).await {
            warn!(group = %group.uuid, error = %err, "Compensation membership delete failed");
        }
        match self.groups.delete_by_uuid(group.uuid).await {
            Ok(true) => {}
            Ok(false) => warn!(group = %group.uuid, "Compensation delete removed no group row"),
            Err(err) => warn!(group = %group.uuid, error = %err, "Compensation group delete failed"),
        }
    }

    /// The group's roster, for anyone who may view it.
    pub async fn roster(&self, ctx: &SessionContext, group_uuid: Uuid) -> AppResult<GroupRoster> {
        let group = self.load_group(group_uuid).await?;
        self.decider
            .require(ctx.user_uuid, Action::ViewRoster, ObjectRef::group(group.uuid))
            .await?;

        let mut members = Vec::new();
        for user in self.groups.list_members(group.id).await? {
            let role = self
                .decider
                .effective_group_role(user.uuid, group.uuid)
                .await?
                .unwrap_or(GroupRole::Member);
            members.push(RosterEntry {
                uuid: user.uuid,
                display_name: user.display_name,
                role,
            });
        }

        Ok(GroupRoster { group, members })
    }

    /// Add a member, optionally as admin. Inviting an existing member
    /// is a conflict.
    pub async fn add_member(
        &self,
        ctx: &SessionContext,
        group_uuid: Uuid,
        member_uuid: Uuid,
        role: GroupRole,
    ) -> AppResult<()> {
        if role == GroupRole::Owner {
            return Err(AppError::validation("Ownership cannot be granted by invite"));
        }
        let group = self.load_group(group_uuid).await?;
        let object = ObjectRef::group(group.uuid);
        self.decider.require(ctx.user_uuid, Action::Invite, object).await?;

        let member = self
            .users
            .find_by_uuid(member_uuid)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;
        if self.groups.membership_exists(member.id, group.id).await? {
            return Err(AppError::conflict("User is already a member of this group"));
        }

        self.groups.add_membership(member.id, group.id).await?;

        let subject = SubjectRef::user(member.uuid);
        let tuples = async {
            self.decider
                .gateway()
                .relate(subject, Relation::Member, object)
                .await?;
            if role == GroupRole::Admin {
                self.decider
                    .gateway()
                    .relate(subject, Relation::Admin, object)
                    .await?;
            }
            Ok::<(), AppError>(())
        };
        if let Err(err) = tuples.await {
            if !self.groups.remove_membership(member.id, group.id).await? {
                warn!(group = %group.uuid, member = %member.uuid, "Compensation removed no membership row");
            }
            return Err(err);
        }

        info!(group = %group.uuid, member = %member.uuid, ?role, "Member added");
        Ok(())
    }

    /// Drop a member's admin role. Demoting someone who is not an
    /// admin is a no-op, not an error.
    pub async fn demote_admin(
        &self,
        ctx: &SessionContext,
        group_uuid: Uuid,
        member_uuid: Uuid,
    ) -> AppResult<()> {
        let group = self.load_group(group_uuid).await?;
        let object = ObjectRef::group(group.uuid);
        self.decider.require(ctx.user_uuid, Action::Invite, object).await?;

        let member = self
            .users
            .find_by_uuid(member_uuid)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        match self
            .decider
            .gateway()
            .unrelate(SubjectRef::user(member.uuid), Relation::Admin, object)
            .await
        {
            Ok(()) => {}
            Err(err) if err.kind == ErrorKind::NotFound => {}
            Err(err) => return Err(err),
        }

        info!(group = %group.uuid, member = %member.uuid, "Admin demoted");
        Ok(())
    }

    /// Remove a member from a group entirely.
    pub async fn remove_member(
        &self,
        _ctx: &SessionContext,
        _group_uuid: Uuid,
        _member_uuid: Uuid,
    ) -> AppResult<()> {
        Err(AppError::not_implemented("Removing group members is not implemented"))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::test_support::{memory_decider, MemoryEntityStore};
    use crate::user::{IdentityProfile, UserService};
    use trove_authz::backend::{MemoryTupleBackend, TupleBackend};
    use trove_authz::tuple::{ObjectType, RelationTuple};
    use trove_authz::{GatewayError, TupleGateway};
    use trove_entity::group::GroupMembership;
    use trove_entity::user::User;

    struct Fixture {
        decider: AccessDecider,
        groups: GroupService,
        users: UserService,
    }

    fn fixture() -> Fixture {
        let store = MemoryEntityStore::new();
        let decider = memory_decider();
        Fixture {
            groups: GroupService::new(store.clone(), store.clone(), decider.clone()),
            users: UserService::new(
                store.clone(),
                store.clone(),
                store.clone(),
                store.clone(),
                decider.clone(),
            ),
            decider,
        }
    }

    async fn login(fx: &Fixture, name: &str) -> SessionContext {
        fx.users
            .login_or_register(&IdentityProfile {
                email: format!("{}@example.com", name.to_lowercase()),
                display_name: name.to_string(),
                avatar_url: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_creator_shows_as_owner_in_roster() {
        let fx = fixture();
        let alice = login(&fx, "Alice").await;
        let group = fx.groups.create_group(&alice, "team").await.unwrap();

        let roster = fx.groups.roster(&alice, group.uuid).await.unwrap();
        assert_eq!(roster.members.len(), 1);
        // Holds both owner and member tuples; owner wins.
        assert_eq!(roster.members[0].role, GroupRole::Owner);
    }

    #[tokio::test]
    async fn test_duplicate_invite_conflicts() {
        let fx = fixture();
        let alice = login(&fx, "Alice").await;
        let bob = login(&fx, "Bob").await;
        let group = fx.groups.create_group(&alice, "team").await.unwrap();

        fx.groups
            .add_member(&alice, group.uuid, bob.user_uuid, GroupRole::Member)
            .await
            .unwrap();
        let again = fx
            .groups
            .add_member(&alice, group.uuid, bob.user_uuid, GroupRole::Member)
            .await;
        assert_eq!(again.unwrap_err().kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_member_cannot_invite_but_admin_can() {
        let fx = fixture();
        let alice = login(&fx, "Alice").await;
        let bob = login(&fx, "Bob").await;
        let carol = login(&fx, "Carol").await;
        let group = fx.groups.create_group(&alice, "team").await.unwrap();

        fx.groups
            .add_member(&alice, group.uuid, bob.user_uuid, GroupRole::Member)
            .await
            .unwrap();
        let denied = fx
            .groups
            .add_member(&bob, group.uuid, carol.user_uuid, GroupRole::Member)
            .await;
        assert_eq!(denied.unwrap_err().kind, ErrorKind::Authorization);

        fx.groups
            .add_member(&alice, group.uuid, carol.user_uuid, GroupRole::Admin)
            .await
            .unwrap();
        let dave = login(&fx, "Dave").await;
        fx.groups
            .add_member(&carol, group.uuid, dave.user_uuid, GroupRole::Member)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_demote_absent_admin_is_recoverable() {
        let fx = fixture();
        let alice = login(&fx, "Alice").await;
        let bob = login(&fx, "Bob").await;
        let group = fx.groups.create_group(&alice, "team").await.unwrap();
        fx.groups
            .add_member(&alice, group.uuid, bob.user_uuid, GroupRole::Member)
            .await
            .unwrap();

        // Bob was never an admin; demotion still succeeds.
        fx.groups
            .demote_admin(&alice, group.uuid, bob.user_uuid)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_demote_drops_admin_role() {
        let fx = fixture();
        let alice = login(&fx, "Alice").await;
        let bob = login(&fx, "Bob").await;
        let group = fx.groups.create_group(&alice, "team").await.unwrap();
        fx.groups
            .add_member(&alice, group.uuid, bob.user_uuid, GroupRole::Admin)
            .await
            .unwrap();
        assert_eq!(
            fx.decider
                .effective_group_role(bob.user_uuid, group.uuid)
                .await
                .unwrap(),
            Some(GroupRole::Admin)
        );

        fx.groups
            .demote_admin(&alice, group.uuid, bob.user_uuid)
            .await
            .unwrap();
        assert_eq!(
            fx.decider
                .effective_group_role(bob.user_uuid, group.uuid)
                .await
                .unwrap(),
            Some(GroupRole::Member)
        );
    }

    #[tokio::test]
    async fn test_remove_member_is_not_implemented() {
        let fx = fixture();
        let alice = login(&fx, "Alice").await;
        let group = fx.groups.create_group(&alice, "team").await.unwrap();
        let result = fx
            .groups
            .remove_member(&alice, group.uuid, alice.user_uuid)
            .await;
        assert_eq!(result.unwrap_err().kind, ErrorKind::NotImplemented);
    }

    /// Group store that refuses membership inserts.
    struct RefusingMemberships {
        inner: Arc<MemoryEntityStore>,
    }

    #[async_trait::async_trait]
    impl GroupStore for RefusingMemberships {
        async fn find_by_uuid(&self, uuid: Uuid) -> AppResult<Option<Group>> {
            GroupStore::find_by_uuid(&*self.inner, uuid).await
        }

        async fn create(&self, data: &CreateGroup) -> AppResult<Group> {
            GroupStore::create(&*self.inner, data).await
        }

        async fn delete_by_uuid(&self, uuid: Uuid) -> AppResult<bool> {
            self.inner.delete_by_uuid(uuid).await
        }

        async fn membership_exists(&self, user_id: i64, group_id: i64) -> AppResult<bool> {
            self.inner.membership_exists(user_id, group_id).await
        }

        async fn add_membership(&self, _user_id: i64, _group_id: i64) -> AppResult<GroupMembership> {
            Err(AppError::internal("membership insert refused"))
        }

        async fn remove_membership(&self, user_id: i64, group_id: i64) -> AppResult<bool> {
            self.inner.remove_membership(user_id, group_id).await
        }

        async fn list_members(&self, group_id: i64) -> AppResult<Vec<User>> {
            self.inner.list_members(group_id).await
        }

        async fn search_prefix(&self, prefix: &str, limit: i64) -> AppResult<Vec<Group>> {
            GroupStore::search_prefix(&*self.inner, prefix, limit).await
        }
    }

    #[tokio::test]
    async fn test_failed_membership_insert_unwinds_creation() {
        let store = MemoryEntityStore::new();
        let decider = memory_decider();
        let users = UserService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            decider.clone(),
        );
        let groups = GroupService::new(
            Arc::new(RefusingMemberships {
                inner: store.clone(),
            }),
            store.clone(),
            decider.clone(),
        );
        let alice = users
            .login_or_register(&IdentityProfile {
                email: "alice@example.com".to_string(),
                display_name: "Alice".to_string(),
                avatar_url: None,
            })
            .await
            .unwrap();

        let result = groups.create_group(&alice, "team").await;
        assert!(result.is_err());

        // Neither the group row nor any tuple survives.
        let rows = GroupStore::search_prefix(&*store, "team", 8).await.unwrap();
        assert!(rows.is_empty());
        let subject = SubjectRef::user(alice.user_uuid);
        for relation in [Relation::Owner, Relation::Member] {
            let held = decider
                .gateway()
                .list_accessible(subject, relation, ObjectType::Group)
                .await
                .unwrap();
            assert!(held.is_empty());
        }
    }

    /// Tuple backend that accepts a fixed number of writes and refuses
    /// the rest.
    struct ExhaustibleBackend {
        inner: MemoryTupleBackend,
        writes: AtomicUsize,
        capacity: usize,
    }

    impl ExhaustibleBackend {
        fn new(capacity: usize) -> Self {
            Self {
                inner: MemoryTupleBackend::new(),
                writes: AtomicUsize::new(0),
                capacity,
            }
        }
    }

    #[async_trait::async_trait]
    impl TupleBackend for ExhaustibleBackend {
        async fn ready(&self) -> Result<(), GatewayError> {
            Ok(())
        }

        async fn write(&self, tuple: &RelationTuple) -> Result<(), GatewayError> {
            if self.writes.fetch_add(1, Ordering::SeqCst) >= self.capacity {
                return Err(GatewayError::Unavailable("write refused".into()));
            }
            self.inner.write(tuple).await
        }

        async fn delete(&self, tuple: &RelationTuple) -> Result<(), GatewayError> {
            self.inner.delete(tuple).await
        }

        async fn check(
            &self,
            subject: &SubjectRef,
            relation: Relation,
            object: &ObjectRef,
        ) -> Result<bool, GatewayError> {
            self.inner.check(subject, relation, object).await
        }

        async fn list_objects(
            &self,
            subject: &SubjectRef,
            relation: Relation,
            object_type: ObjectType,
        ) -> Result<Vec<ObjectRef>, GatewayError> {
            self.inner.list_objects(subject, relation, object_type).await
        }
    }

    #[tokio::test]
    async fn test_failed_tuple_write_unwinds_creation() {
        let store = MemoryEntityStore::new();
        // Registration writes three tuples (folder owner, readme owner,
        // readme parent); the group's owner tuple lands as the fourth
        // and its member tuple is refused.
        let decider = AccessDecider::new(Arc::new(TupleGateway::with_backend(Arc::new(
            ExhaustibleBackend::new(4),
        ))));
        let users = UserService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            decider.clone(),
        );
        let groups = GroupService::new(store.clone(), store.clone(), decider.clone());
        let alice = users
            .login_or_register(&IdentityProfile {
                email: "alice@example.com".to_string(),
                display_name: "Alice".to_string(),
                avatar_url: None,
            })
            .await
            .unwrap();

        let result = groups.create_group(&alice, "team").await;
        assert_eq!(result.unwrap_err().kind, ErrorKind::ServiceUnavailable);

        // The owner tuple that landed was removed along with the rows.
        let rows = GroupStore::search_prefix(&*store, "team", 8).await.unwrap();
        assert!(rows.is_empty());
        let subject = SubjectRef::user(alice.user_uuid);
        let owned = decider
            .gateway()
            .list_accessible(subject, Relation::Owner, ObjectType::Group)
            .await
            .unwrap();
        assert!(owned.is_empty());
    }
}
