//! Folder creation, listing, and subtree deletion.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use trove_authz::tuple::{ObjectRef, ObjectType, Relation, RelationTuple, SubjectRef};
use trove_authz::{AccessDecider, Action};
use trove_core::error::{AppError, ErrorKind};
use trove_core::result::AppResult;
use trove_entity::folder::{CreateFolder, Folder};
use trove_entity::store::{FileStore, FolderStore, RepairStore, UserStore};

use crate::context::SessionContext;
use crate::folder::traversal::{collect_subtree, Subtree};

/// Kind of a listing entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// The parent folder, shown as "..".
    Parent,
    /// A child folder.
    Folder,
    /// A file in the folder.
    File,
}

/// One row of a folder listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingEntry {
    /// Entry kind.
    pub kind: EntryKind,
    /// Public uuid of the entry.
    pub uuid: Uuid,
    /// Display name (".." for the parent entry).
    pub name: String,
}

/// A folder plus its visible contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderListing {
    /// The listed folder.
    pub folder: Folder,
    /// Parent link, child folders, then files.
    pub entries: Vec<ListingEntry>,
}

/// Result of a subtree deletion.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeletionSummary {
    /// Folder rows removed.
    pub folders_removed: u64,
    /// File rows removed.
    pub files_removed: u64,
}

/// Manages the folder tree.
pub struct FolderService {
    folders: Arc<dyn FolderStore>,
    files: Arc<dyn FileStore>,
    users: Arc<dyn UserStore>,
    repair: Arc<dyn RepairStore>,
    decider: AccessDecider,
}

impl FolderService {
    /// Creates a new folder service.
    pub fn new(
        folders: Arc<dyn FolderStore>,
        files: Arc<dyn FileStore>,
        users: Arc<dyn UserStore>,
        repair: Arc<dyn RepairStore>,
        decider: AccessDecider,
    ) -> Self {
        Self {
            folders,
            files,
            users,
            repair,
            decider,
        }
    }

    async fn load_folder(&self, uuid: Uuid) -> AppResult<Folder> {
        self.folders
            .find_by_uuid(uuid)
            .await?
            .ok_or_else(|| AppError::not_found("Folder not found"))
    }

    /// Create a folder inside a parent the caller may create in.
    pub async fn create_folder(
        &self,
        ctx: &SessionContext,
        parent_uuid: Uuid,
        name: &str,
    ) -> AppResult<Folder> {
        if name.trim().is_empty() {
            return Err(AppError::validation("Folder name must not be empty"));
        }
        let parent = self.load_folder(parent_uuid).await?;
        self.decider
            .require(ctx.user_uuid, Action::CreateInside, ObjectRef::folder(parent.uuid))
            .await?;

        let folder = self
            .folders
            .create(&CreateFolder {
                uuid: Uuid::new_v4(),
                creator_id: ctx.user_id,
                name: name.to_string(),
                is_default_folder: false,
                parent_uuid: Some(parent.uuid),
            })
            .await?;

        let object = ObjectRef::folder(folder.uuid);
        let tuples = async {
            self.decider
                .gateway()
                .relate(SubjectRef::user(ctx.user_uuid), Relation::Owner, object)
                .await?;
            self.decider
                .gateway()
                .relate(SubjectRef::Folder(parent.uuid), Relation::Parent, object)
                .await
        };
        if let Err(err) = tuples.await {
            if !self.folders.delete_by_uuid(folder.uuid).await? {
                warn!(folder = %folder.uuid, "Compensation delete removed no folder row");
            }
            return Err(err);
        }

        info!(folder = %folder.uuid, parent = %parent.uuid, "Folder created");
        Ok(folder)
    }

    /// List a folder's visible contents.
    ///
    /// One reverse query per entity type replaces per-child checks; the
    /// candidate children are intersected with the readable set. The
    /// ".." entry is gated exactly like any child.
    pub async fn list(&self, ctx: &SessionContext, folder_uuid: Uuid) -> AppResult<FolderListing> {
        let folder = self.load_folder(folder_uuid).await?;
        self.decider
            .require(ctx.user_uuid, Action::Read, ObjectRef::folder(folder.uuid))
            .await?;

        let readable_folders = self
            .decider
            .readable(ctx.user_uuid, ObjectType::Folder)
            .await?;
        let readable_files = self.decider.readable(ctx.user_uuid, ObjectType::File).await?;

        let mut entries = Vec::new();
        if let Some(parent_uuid) = folder.parent_uuid {
            if readable_folders.contains(&parent_uuid) {
                entries.push(ListingEntry {
                    kind: EntryKind::Parent,
                    uuid: parent_uuid,
                    name: "..".to_string(),
                });
            }
        }
        for child in self.folders.children_of(folder.uuid).await? {
            if readable_folders.contains(&child.uuid) {
                entries.push(ListingEntry {
                    kind: EntryKind::Folder,
                    uuid: child.uuid,
                    name: child.name,
                });
            }
        }
        for file in self.files.files_in_folder(folder.uuid).await? {
            if readable_files.contains(&file.uuid) {
                entries.push(ListingEntry {
                    kind: EntryKind::File,
                    uuid: file.uuid,
                    name: file.name,
                });
            }
        }

        Ok(FolderListing { folder, entries })
    }

    /// Delete a folder and everything under it.
    ///
    /// Entity rows go first, in one transaction; tuple cleanup follows.
    /// Tuples that fail to delete are parked in the repair ledger, so a
    /// committed entity deletion never rolls back.
    pub async fn delete_folder(
        &self,
        ctx: &SessionContext,
        folder_uuid: Uuid,
    ) -> AppResult<DeletionSummary> {
        let folder = self.load_folder(folder_uuid).await?;
        if folder.is_default_folder {
            return Err(AppError::validation("The default folder cannot be deleted"));
        }
        self.decider
            .require(ctx.user_uuid, Action::Delete, ObjectRef::folder(folder.uuid))
            .await?;

        let subtree = collect_subtree(self.folders.as_ref(), self.files.as_ref(), folder).await?;
        let (folders_removed, files_removed) = self
            .folders
            .delete_subtree(&subtree.folder_uuids(), &subtree.file_uuids())
            .await?;

        self.cleanup_tuples(&subtree).await?;

        info!(
            folder = %folder_uuid,
            folders_removed,
            files_removed,
            "Folder subtree deleted"
        );
        Ok(DeletionSummary {
            folders_removed,
            files_removed,
        })
    }

    /// Delete the owner and parent tuples of a removed subtree. Absent
    /// tuples are fine; anything else goes to the repair ledger.
    async fn cleanup_tuples(&self, subtree: &Subtree) -> AppResult<()> {
        let mut creator_uuids: HashMap<i64, Option<Uuid>> = HashMap::new();
        let mut tuples = Vec::new();

        for folder in &subtree.folders {
            let object = ObjectRef::folder(folder.uuid);
            if let Some(creator) = self.creator_uuid(&mut creator_uuids, folder.creator_id).await? {
                tuples.push(RelationTuple::new(
                    SubjectRef::user(creator),
                    Relation::Owner,
                    object,
                ));
            }
            if let Some(parent) = folder.parent_uuid {
                tuples.push(RelationTuple::new(
                    SubjectRef::Folder(parent),
                    Relation::Parent,
                    object,
                ));
            }
        }
        for file in &subtree.files {
            let object = ObjectRef::file(file.uuid);
            if let Some(creator) = self.creator_uuid(&mut creator_uuids, file.creator_id).await? {
                tuples.push(RelationTuple::new(
                    SubjectRef::user(creator),
                    Relation::Owner,
                    object,
                ));
            }
            tuples.push(RelationTuple::new(
                SubjectRef::Folder(file.folder_uuid),
                Relation::Parent,
                object,
            ));
        }

        let mut orphans = Vec::new();
        for tuple in tuples {
            match self
                .decider
                .gateway()
                .unrelate(tuple.subject, tuple.relation, tuple.object)
                .await
            {
                Ok(()) => {}
                Err(err) if err.kind == ErrorKind::NotFound => {}
                Err(err) => {
                    warn!(%tuple, error = %err, "Tuple delete failed, recording orphan");
                    orphans.push(tuple.to_string());
                }
            }
        }
        self.repair.record_orphans(&orphans).await
    }

    async fn creator_uuid(
        &self,
        cache: &mut HashMap<i64, Option<Uuid>>,
        creator_id: i64,
    ) -> AppResult<Option<Uuid>> {
        if let Some(known) = cache.get(&creator_id) {
            return Ok(*known);
        }
        let uuid = self
            .users
            .find_by_id(creator_id)
            .await?
            .map(|user| user.uuid);
        cache.insert(creator_id, uuid);
        Ok(uuid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{memory_decider, MemoryEntityStore};
    use crate::user::{IdentityProfile, UserService};

    struct Fixture {
        store: Arc<MemoryEntityStore>,
        decider: AccessDecider,
        folders: FolderService,
        users: UserService,
    }

    fn fixture() -> Fixture {
        let store = MemoryEntityStore::new();
        let decider = memory_decider();
        Fixture {
            folders: FolderService::new(
                store.clone(),
                store.clone(),
                store.clone(),
                store.clone(),
                decider.clone(),
            ),
            users: UserService::new(
                store.clone(),
                store.clone(),
                store.clone(),
                store.clone(),
                decider.clone(),
            ),
            store,
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
    async fn test_create_requires_permission_on_parent() {
        let fx = fixture();
        let alice = login(&fx, "Alice").await;
        let bob = login(&fx, "Bob").await;

        let denied = fx
            .folders
            .create_folder(&bob, alice.default_folder_uuid, "intrusion")
            .await;
        assert_eq!(denied.unwrap_err().kind, ErrorKind::Authorization);

        let created = fx
            .folders
            .create_folder(&alice, alice.default_folder_uuid, "projects")
            .await
            .unwrap();
        assert_eq!(created.parent_uuid, Some(alice.default_folder_uuid));
    }

    #[tokio::test]
    async fn test_default_folder_is_undeletable() {
        let fx = fixture();
        let alice = login(&fx, "Alice").await;

        let refused = fx
            .folders
            .delete_folder(&alice, alice.default_folder_uuid)
            .await;
        assert_eq!(refused.unwrap_err().kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_delete_subtree_counts_and_rows() {
        let fx = fixture();
        let alice = login(&fx, "Alice").await;
        let top = fx
            .folders
            .create_folder(&alice, alice.default_folder_uuid, "top")
            .await
            .unwrap();
        let inner = fx
            .folders
            .create_folder(&alice, top.uuid, "inner")
            .await
            .unwrap();

        let summary = fx.folders.delete_folder(&alice, top.uuid).await.unwrap();
        assert_eq!(summary.folders_removed, 2);
        assert_eq!(summary.files_removed, 0);

        assert!(FolderStore::find_by_uuid(fx.store.as_ref(), inner.uuid)
            .await
            .unwrap()
            .is_none());
        // Clean tuple cleanup leaves no repair entries.
        assert!(fx.store.orphans.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_non_owner_cannot_delete() {
        let fx = fixture();
        let alice = login(&fx, "Alice").await;
        let bob = login(&fx, "Bob").await;
        let top = fx
            .folders
            .create_folder(&alice, alice.default_folder_uuid, "top")
            .await
            .unwrap();

        // Even a writer is not an owner.
        fx.decider
            .gateway()
            .relate(
                SubjectRef::user(bob.user_uuid),
                Relation::Writer,
                ObjectRef::folder(top.uuid),
            )
            .await
            .unwrap();
        let denied = fx.folders.delete_folder(&bob, top.uuid).await;
        assert_eq!(denied.unwrap_err().kind, ErrorKind::Authorization);
    }

    #[tokio::test]
    async fn test_listing_gates_parent_entry() {
        let fx = fixture();
        let alice = login(&fx, "Alice").await;
        let bob = login(&fx, "Bob").await;
        let shared = fx
            .folders
            .create_folder(&alice, alice.default_folder_uuid, "shared")
            .await
            .unwrap();

        fx.decider
            .gateway()
            .relate(
                SubjectRef::user(bob.user_uuid),
                Relation::Viewer,
                ObjectRef::folder(shared.uuid),
            )
            .await
            .unwrap();

        // Bob reads the shared folder but cannot see Alice's root, so no
        // ".." entry appears.
        let listing = fx.folders.list(&bob, shared.uuid).await.unwrap();
        assert!(listing.entries.iter().all(|e| e.kind != EntryKind::Parent));

        // Alice sees the parent link.
        let listing = fx.folders.list(&alice, shared.uuid).await.unwrap();
        assert!(listing
            .entries
            .iter()
            .any(|e| e.kind == EntryKind::Parent && e.uuid == alice.default_folder_uuid));
    }
}
