//! File creation, loading, saving, and deletion.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use trove_authz::tuple::{ObjectRef, Relation, SubjectRef};
use trove_authz::{AccessDecider, Action};
use trove_core::error::{AppError, ErrorKind};
use trove_core::result::AppResult;
use trove_entity::file::{CreateFile, File};
use trove_entity::store::{FileStore, FolderStore, RepairStore, UserStore};

use crate::context::SessionContext;

/// Manages files within folders.
pub struct FileService {
    files: Arc<dyn FileStore>,
    folders: Arc<dyn FolderStore>,
    users: Arc<dyn UserStore>,
    repair: Arc<dyn RepairStore>,
    decider: AccessDecider,
}

impl FileService {
    /// Creates a new file service.
    pub fn new(
        files: Arc<dyn FileStore>,
        folders: Arc<dyn FolderStore>,
        users: Arc<dyn UserStore>,
        repair: Arc<dyn RepairStore>,
        decider: AccessDecider,
    ) -> Self {
        Self {
            files,
            folders,
            users,
            repair,
            decider,
        }
    }

    async fn load(&self, uuid: Uuid) -> AppResult<File> {
        self.files
            .find_by_uuid(uuid)
            .await?
            .ok_or_else(|| AppError::not_found("File not found"))
    }

    /// Create a file inside a folder the caller may create in.
    pub async fn create_file(
        &self,
        ctx: &SessionContext,
        folder_uuid: Uuid,
        name: &str,
        content: &str,
    ) -> AppResult<File> {
        if name.trim().is_empty() {
            return Err(AppError::validation("File name must not be empty"));
        }
        let folder = self
            .folders
            .find_by_uuid(folder_uuid)
            .await?
            .ok_or_else(|| AppError::not_found("Folder not found"))?;
        self.decider
            .require(ctx.user_uuid, Action::CreateInside, ObjectRef::folder(folder.uuid))
            .await?;

        let file = self
            .files
            .create(&CreateFile {
                uuid: Uuid::new_v4(),
                folder_uuid: folder.uuid,
                name: name.to_string(),
                text_content: content.to_string(),
                creator_id: ctx.user_id,
            })
            .await?;

        let object = ObjectRef::file(file.uuid);
        let tuples = async {
            self.decider
                .gateway()
                .relate(SubjectRef::user(ctx.user_uuid), Relation::Owner, object)
                .await?;
            self.decider
                .gateway()
                .relate(SubjectRef::Folder(folder.uuid), Relation::Parent, object)
                .await
        };
        if let Err(err) = tuples.await {
            if !self.files.delete_by_uuid(file.uuid).await? {
                warn!(file = %file.uuid, "Compensation delete removed no file row");
            }
            return Err(err);
        }

        info!(file = %file.uuid, folder = %folder.uuid, "File created");
        Ok(file)
    }

    /// Load a file the caller may read.
    pub async fn load_file(&self, ctx: &SessionContext, file_uuid: Uuid) -> AppResult<File> {
        let file = self.load(file_uuid).await?;
        self.decider
            .require(ctx.user_uuid, Action::Read, ObjectRef::file(file.uuid))
            .await?;
        Ok(file)
    }

    /// Replace a file's content.
    pub async fn save_file(
        &self,
        ctx: &SessionContext,
        file_uuid: Uuid,
        content: &str,
    ) -> AppResult<File> {
        let file = self.load(file_uuid).await?;
        self.decider
            .require(ctx.user_uuid, Action::Write, ObjectRef::file(file.uuid))
            .await?;
        self.files.update_content(file.uuid, content).await
    }

    /// Delete a file. The row goes first; tuple cleanup failures are
    /// parked in the repair ledger.
    pub async fn delete_file(&self, ctx: &SessionContext, file_uuid: Uuid) -> AppResult<()> {
        let file = self.load(file_uuid).await?;
        let object = ObjectRef::file(file.uuid);
        self.decider.require(ctx.user_uuid, Action::Write, object).await?;

        if !self.files.delete_by_uuid(file.uuid).await? {
            return Err(AppError::not_found("File not found"));
        }

        let creator = self.users.find_by_id(file.creator_id).await?;
        let mut tuples = Vec::new();
        if let Some(creator) = creator {
            tuples.push((SubjectRef::user(creator.uuid), Relation::Owner));
        }
        tuples.push((SubjectRef::Folder(file.folder_uuid), Relation::Parent));

        let mut orphans = Vec::new();
        for (subject, relation) in tuples {
            match self.decider.gateway().unrelate(subject, relation, object).await {
                Ok(()) => {}
                Err(err) if err.kind == ErrorKind::NotFound => {}
                Err(err) => {
                    warn!(%subject, %relation, %object, error = %err, "Tuple delete failed");
                    orphans.push(format!("{subject} {relation} {object}"));
                }
            }
        }
        self.repair.record_orphans(&orphans).await?;

        info!(file = %file.uuid, "File deleted");
        Ok(())
    }

    /// Remove a file from every listing under a folder subtree.
    pub async fn prune_file(
        &self,
        _ctx: &SessionContext,
        _folder_uuid: Uuid,
        _file_uuid: Uuid,
    ) -> AppResult<()> {
        Err(AppError::not_implemented(
            "Pruning a file from a folder subtree is not implemented",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{memory_decider, MemoryEntityStore};
    use crate::user::{IdentityProfile, UserService};

    struct Fixture {
        decider: AccessDecider,
        files: FileService,
        users: UserService,
    }

    fn fixture() -> Fixture {
        let store = MemoryEntityStore::new();
        let decider = memory_decider();
        Fixture {
            files: FileService::new(
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
    async fn test_create_then_load_roundtrip() {
        let fx = fixture();
        let alice = login(&fx, "Alice").await;

        let created = fx
            .files
            .create_file(&alice, alice.default_folder_uuid, "notes.txt", "hello")
            .await
            .unwrap();
        let loaded = fx.files.load_file(&alice, created.uuid).await.unwrap();

        assert_eq!(loaded.name, "notes.txt");
        assert_eq!(loaded.text_content, "hello");
    }

    #[tokio::test]
    async fn test_viewer_cannot_save() {
        let fx = fixture();
        let alice = login(&fx, "Alice").await;
        let bob = login(&fx, "Bob").await;
        let file = fx
            .files
            .create_file(&alice, alice.default_folder_uuid, "doc", "v1")
            .await
            .unwrap();

        fx.decider
            .gateway()
            .relate(
                SubjectRef::user(bob.user_uuid),
                Relation::Viewer,
                ObjectRef::file(file.uuid),
            )
            .await
            .unwrap();

        assert!(fx.files.load_file(&bob, file.uuid).await.is_ok());
        let denied = fx.files.save_file(&bob, file.uuid, "v2").await;
        assert_eq!(denied.unwrap_err().kind, ErrorKind::Authorization);
    }

    #[tokio::test]
    async fn test_delete_removes_row_and_access() {
        let fx = fixture();
        let alice = login(&fx, "Alice").await;
        let file = fx
            .files
            .create_file(&alice, alice.default_folder_uuid, "tmp", "")
            .await
            .unwrap();

        fx.files.delete_file(&alice, file.uuid).await.unwrap();

        let gone = fx.files.load_file(&alice, file.uuid).await;
        assert_eq!(gone.unwrap_err().kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_prune_is_not_implemented() {
        let fx = fixture();
        let alice = login(&fx, "Alice").await;
        let result = fx
            .files
            .prune_file(&alice, alice.default_folder_uuid, Uuid::new_v4())
            .await;
        assert_eq!(result.unwrap_err().kind, ErrorKind::NotImplemented);
    }
}
