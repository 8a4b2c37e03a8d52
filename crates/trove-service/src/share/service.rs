//! Share grants.
//!
//! A share writes a single stored tuple: `writer` when write access is
//! granted, otherwise `viewer`. Group shares target the group's member
//! set, so membership changes take effect without touching the shared
//! object.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use trove_authz::tuple::{ObjectRef, Relation, SubjectRef};
use trove_authz::{AccessDecider, Action};
use trove_core::error::AppError;
use trove_core::result::AppResult;
use trove_entity::store::{FileStore, FolderStore, GroupStore, UserStore};

use crate::context::SessionContext;

/// Who a share is granted to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "uuid")]
pub enum ShareTarget {
    /// A single user.
    User(Uuid),
    /// A group's member set.
    Group(Uuid),
}

/// Grants access to folders and files.
pub struct ShareService {
    folders: Arc<dyn FolderStore>,
    files: Arc<dyn FileStore>,
    groups: Arc<dyn GroupStore>,
    users: Arc<dyn UserStore>,
    decider: AccessDecider,
}

impl ShareService {
    /// Creates a new share service.
    pub fn new(
        folders: Arc<dyn FolderStore>,
        files: Arc<dyn FileStore>,
        groups: Arc<dyn GroupStore>,
        users: Arc<dyn UserStore>,
        decider: AccessDecider,
    ) -> Self {
        Self {
            folders,
            files,
            groups,
            users,
            decider,
        }
    }

    /// Resolve a target to a tuple subject, verifying it exists.
    async fn resolve_target(&self, target: ShareTarget) -> AppResult<SubjectRef> {
        match target {
            ShareTarget::User(uuid) => {
                self.users
                    .find_by_uuid(uuid)
                    .await?
                    .ok_or_else(|| AppError::not_found("User not found"))?;
                Ok(SubjectRef::user(uuid))
            }
            ShareTarget::Group(uuid) => {
                self.groups
                    .find_by_uuid(uuid)
                    .await?
                    .ok_or_else(|| AppError::not_found("Group not found"))?;
                Ok(SubjectRef::group_members(uuid))
            }
        }
    }

    async fn grant(
        &self,
        ctx: &SessionContext,
        object: ObjectRef,
        target: ShareTarget,
        allow_write: bool,
    ) -> AppResult<()> {
        self.decider.require(ctx.user_uuid, Action::Share, object).await?;
        let subject = self.resolve_target(target).await?;
        let relation = if allow_write {
            Relation::Writer
        } else {
            Relation::Viewer
        };
        self.decider.gateway().relate(subject, relation, object).await?;
        info!(%subject, %relation, %object, "Share granted");
        Ok(())
    }

    /// Share a folder.
    pub async fn share_folder(
        &self,
        ctx: &SessionContext,
        folder_uuid: Uuid,
        target: ShareTarget,
        allow_write: bool,
    ) -> AppResult<()> {
        self.folders
            .find_by_uuid(folder_uuid)
            .await?
            .ok_or_else(|| AppError::not_found("Folder not found"))?;
        self.grant(ctx, ObjectRef::folder(folder_uuid), target, allow_write)
            .await
    }

    /// Share a file.
    pub async fn share_file(
        &self,
        ctx: &SessionContext,
        file_uuid: Uuid,
        target: ShareTarget,
        allow_write: bool,
    ) -> AppResult<()> {
        self.files
            .find_by_uuid(file_uuid)
            .await?
            .ok_or_else(|| AppError::not_found("File not found"))?;
        self.grant(ctx, ObjectRef::file(file_uuid), target, allow_write)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::GroupService;
    use crate::test_support::{memory_decider, MemoryEntityStore};
    use crate::user::{IdentityProfile, UserService};
    use trove_core::error::ErrorKind;
    use trove_entity::group::GroupRole;

    struct Fixture {
        decider: AccessDecider,
        shares: ShareService,
        groups: GroupService,
        users: UserService,
    }

    fn fixture() -> Fixture {
        let store = MemoryEntityStore::new();
        let decider = memory_decider();
        Fixture {
            shares: ShareService::new(
                store.clone(),
                store.clone(),
                store.clone(),
                store.clone(),
                decider.clone(),
            ),
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
    async fn test_share_grants_read_not_write() {
        let fx = fixture();
        let alice = login(&fx, "Alice").await;
        let bob = login(&fx, "Bob").await;
        let folder = ObjectRef::folder(alice.default_folder_uuid);

        fx.shares
            .share_folder(
                &alice,
                alice.default_folder_uuid,
                ShareTarget::User(bob.user_uuid),
                false,
            )
            .await
            .unwrap();

        assert!(fx.decider.allows(bob.user_uuid, Action::Read, folder).await.unwrap());
        assert!(!fx.decider.allows(bob.user_uuid, Action::Write, folder).await.unwrap());
    }

    #[tokio::test]
    async fn test_only_owner_may_share() {
        let fx = fixture();
        let alice = login(&fx, "Alice").await;
        let bob = login(&fx, "Bob").await;
        let carol = login(&fx, "Carol").await;

        fx.shares
            .share_folder(
                &alice,
                alice.default_folder_uuid,
                ShareTarget::User(bob.user_uuid),
                true,
            )
            .await
            .unwrap();

        // A writer still cannot re-share.
        let denied = fx
            .shares
            .share_folder(
                &bob,
                alice.default_folder_uuid,
                ShareTarget::User(carol.user_uuid),
                false,
            )
            .await;
        assert_eq!(denied.unwrap_err().kind, ErrorKind::Authorization);
    }

    #[tokio::test]
    async fn test_group_share_covers_future_members() {
        let fx = fixture();
        let alice = login(&fx, "Alice").await;
        let bob = login(&fx, "Bob").await;
        let group = fx.groups.create_group(&alice, "team").await.unwrap();
        let folder = ObjectRef::folder(alice.default_folder_uuid);

        fx.shares
            .share_folder(
                &alice,
                alice.default_folder_uuid,
                ShareTarget::Group(group.uuid),
                false,
            )
            .await
            .unwrap();
        assert!(!fx.decider.allows(bob.user_uuid, Action::Read, folder).await.unwrap());

        // Joining after the share suffices; no new tuple on the folder.
        fx.groups
            .add_member(&alice, group.uuid, bob.user_uuid, GroupRole::Member)
            .await
            .unwrap();
        assert!(fx.decider.allows(bob.user_uuid, Action::Read, folder).await.unwrap());
    }

    #[tokio::test]
    async fn test_share_with_unknown_target_fails() {
        let fx = fixture();
        let alice = login(&fx, "Alice").await;

        let missing = fx
            .shares
            .share_folder(
                &alice,
                alice.default_folder_uuid,
                ShareTarget::User(Uuid::new_v4()),
                false,
            )
            .await;
        assert_eq!(missing.unwrap_err().kind, ErrorKind::NotFound);
    }
}
