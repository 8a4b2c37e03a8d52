//! User login/registration and the share-target directory.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use trove_authz::tuple::{ObjectRef, Relation, SubjectRef};
use trove_authz::AccessDecider;
use trove_core::error::AppError;
use trove_core::result::AppResult;
use trove_entity::file::CreateFile;
use trove_entity::folder::{CreateFolder, Folder};
use trove_entity::store::{FileStore, FolderStore, GroupStore, UserStore};
use trove_entity::user::{CreateUser, User};

use crate::context::SessionContext;

/// Maximum entries returned by the share-target autocomplete.
const AUTOCOMPLETE_LIMIT: i64 = 8;

/// Seed content of the Readme file created with a fresh workspace.
const README_CONTENT: &str =
    "Welcome to your workspace. Create files and folders here, and share them from the listing.";

/// Profile fields supplied by the identity provider after login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityProfile {
    /// Verified email address.
    pub email: String,
    /// Display name.
    pub display_name: String,
    /// Avatar image URL.
    pub avatar_url: Option<String>,
}

/// Kind of a directory suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    /// A user account.
    User,
    /// A sharing group.
    Group,
}

/// One autocomplete hit: a shareable user or group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    /// Whether this is a user or a group.
    pub kind: SuggestionKind,
    /// Public uuid, usable as a share target.
    pub uuid: Uuid,
    /// Display label.
    pub label: String,
}

/// Registers users on first login and provisions their workspace.
pub struct UserService {
    users: Arc<dyn UserStore>,
    groups: Arc<dyn GroupStore>,
    folders: Arc<dyn FolderStore>,
    files: Arc<dyn FileStore>,
    decider: AccessDecider,
}

impl UserService {
    /// Creates a new user service.
    pub fn new(
        users: Arc<dyn UserStore>,
        groups: Arc<dyn GroupStore>,
        folders: Arc<dyn FolderStore>,
        files: Arc<dyn FileStore>,
        decider: AccessDecider,
    ) -> Self {
        Self {
            users,
            groups,
            folders,
            files,
            decider,
        }
    }

    /// Establish a session for an authenticated identity, registering
    /// the user and provisioning their default workspace on first login.
    pub async fn login_or_register(&self, profile: &IdentityProfile) -> AppResult<SessionContext> {
        let user = match self.users.find_by_email(&profile.email).await? {
            Some(existing) => existing,
            None => {
                info!(email = %profile.email, "Registering new user");
                self.users
                    .create(&CreateUser {
                        uuid: Uuid::new_v4(),
                        email: profile.email.clone(),
                        display_name: profile.display_name.clone(),
                        avatar_url: profile.avatar_url.clone(),
                    })
                    .await?
            }
        };

        let default_folder = match self.folders.default_folder_for(user.id).await? {
            Some(folder) => folder,
            None => self.provision_workspace(&user).await?,
        };

        Ok(SessionContext::new(&user, &default_folder))
    }

    /// Create the default folder with its owner tuple and the seed
    /// Readme file. Entity rows written without their paired tuple are
    /// rolled back so a retry starts clean.
    async fn provision_workspace(&self, user: &User) -> AppResult<Folder> {
        let folder = self
            .folders
            .create(&CreateFolder {
                uuid: Uuid::new_v4(),
                creator_id: user.id,
                name: format!("{}'s Folder", user.display_name),
                is_default_folder: true,
                parent_uuid: None,
            })
            .await?;

        let subject = SubjectRef::user(user.uuid);
        let folder_ref = ObjectRef::folder(folder.uuid);
        if let Err(err) = self
            .decider
            .gateway()
            .relate(subject, Relation::Owner, folder_ref)
            .await
        {
            if !self.folders.delete_by_uuid(folder.uuid).await? {
                warn!(folder = %folder.uuid, "Compensation delete removed no folder row");
            }
            return Err(err);
        }

        let readme = self
            .files
            .create(&CreateFile {
                uuid: Uuid::new_v4(),
                folder_uuid: folder.uuid,
                name: "Readme".to_string(),
                text_content: README_CONTENT.to_string(),
                creator_id: user.id,
            })
            .await?;

        let file_ref = ObjectRef::file(readme.uuid);
        let seed_tuples = async {
            self.decider
                .gateway()
                .relate(subject, Relation::Owner, file_ref)
                .await?;
            self.decider
                .gateway()
                .relate(SubjectRef::Folder(folder.uuid), Relation::Parent, file_ref)
                .await
        };
        if let Err(err) = seed_tuples.await {
            if !self.files.delete_by_uuid(readme.uuid).await? {
                warn!(file = %readme.uuid, "Compensation delete removed no file row");
            }
            return Err(err);
        }

        info!(user = %user.uuid, folder = %folder.uuid, "Provisioned default workspace");
        Ok(folder)
    }

    /// Case-sensitive prefix search over users and groups, capped at
    /// eight suggestions total.
    pub async fn autocomplete(&self, prefix: &str) -> AppResult<Vec<Suggestion>> {
        if prefix.is_empty() {
            return Err(AppError::validation("Autocomplete prefix must not be empty"));
        }

        let mut suggestions = Vec::new();
        for user in self.users.search_prefix(prefix, AUTOCOMPLETE_LIMIT).await? {
            suggestions.push(Suggestion {
                kind: SuggestionKind::User,
                uuid: user.uuid,
                label: user.display_name,
            });
        }
        for group in self.groups.search_prefix(prefix, AUTOCOMPLETE_LIMIT).await? {
            suggestions.push(Suggestion {
                kind: SuggestionKind::Group,
                uuid: group.uuid,
                label: group.name,
            });
        }
        suggestions.truncate(AUTOCOMPLETE_LIMIT as usize);
        Ok(suggestions)
    }
}
