//! In-memory entity store for tests.
//!
//! Implements every store trait over plain vectors so the services can
//! be exercised end to end together with the in-memory tuple backend,
//! without a database. The service unit tests use it directly; the
//! workspace integration tests pull it in through the `test-support`
//! feature.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use trove_authz::backend::MemoryTupleBackend;
use trove_authz::{AccessDecider, TupleGateway};
use trove_core::error::AppError;
use trove_core::result::AppResult;
use trove_entity::file::{CreateFile, File};
use trove_entity::folder::{CreateFolder, Folder};
use trove_entity::group::{CreateGroup, Group, GroupMembership};
use trove_entity::store::{FileStore, FolderStore, GroupStore, RepairStore, UserStore};
use trove_entity::user::{CreateUser, User};

#[derive(Default)]
pub struct MemoryEntityStore {
    next_id: AtomicI64,
    users: Mutex<Vec<User>>,
    groups: Mutex<Vec<Group>>,
    memberships: Mutex<Vec<GroupMembership>>,
    folders: Mutex<Vec<Folder>>,
    files: Mutex<Vec<File>>,
    pub orphans: Mutex<Vec<String>>,
}

impl MemoryEntityStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn lock<T>(guard: std::sync::LockResult<T>) -> AppResult<T> {
        guard.map_err(|_| AppError::internal("Store lock poisoned"))
    }
}

/// A decider over a fresh in-memory tuple backend.
pub fn memory_decider() -> AccessDecider {
    AccessDecider::new(Arc::new(TupleGateway::with_backend(Arc::new(
        MemoryTupleBackend::new(),
    ))))
}

#[async_trait]
impl UserStore for MemoryEntityStore {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        let users = Self::lock(self.users.lock())?;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_uuid(&self, uuid: Uuid) -> AppResult<Option<User>> {
        let users = Self::lock(self.users.lock())?;
        Ok(users.iter().find(|u| u.uuid == uuid).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let users = Self::lock(self.users.lock())?;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn create(&self, data: &CreateUser) -> AppResult<User> {
        let user = User {
            id: self.next_id(),
            uuid: data.uuid,
            email: data.email.clone(),
            display_name: data.display_name.clone(),
            avatar_url: data.avatar_url.clone(),
            created_at: Utc::now(),
        };
        Self::lock(self.users.lock())?.push(user.clone());
        Ok(user)
    }

    async fn search_prefix(&self, prefix: &str, limit: i64) -> AppResult<Vec<User>> {
        let users = Self::lock(self.users.lock())?;
        let mut hits: Vec<User> = users
            .iter()
            .filter(|u| u.display_name.starts_with(prefix))
            .cloned()
            .collect();
        hits.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        hits.truncate(limit as usize);
        Ok(hits)
    }
}

#[async_trait]
impl GroupStore for MemoryEntityStore {
    async fn find_by_uuid(&self, uuid: Uuid) -> AppResult<Option<Group>> {
        let groups = Self::lock(self.groups.lock())?;
        Ok(groups.iter().find(|g| g.uuid == uuid).cloned())
    }

    async fn create(&self, data: &CreateGroup) -> AppResult<Group> {
        let group = Group {
            id: self.next_id(),
            uuid: data.uuid,
            name: data.name.clone(),
            creator_id: data.creator_id,
        };
        Self::lock(self.groups.lock())?.push(group.clone());
        Ok(group)
    }

    async fn delete_by_uuid(&self, uuid: Uuid) -> AppResult<bool> {
        let mut groups = Self::lock(self.groups.lock())?;
        let before = groups.len();
        groups.retain(|g| g.uuid != uuid);
        Ok(groups.len() < before)
    }

    async fn membership_exists(&self, user_id: i64, group_id: i64) -> AppResult<bool> {
        let memberships = Self::lock(self.memberships.lock())?;
        Ok(memberships
            .iter()
            .any(|m| m.user_id == user_id && m.group_id == group_id))
    }

    async fn add_membership(&self, user_id: i64, group_id: i64) -> AppResult<GroupMembership> {
        let membership = GroupMembership {
            id: self.next_id(),
            user_id,
            group_id,
        };
        Self::lock(self.memberships.lock())?.push(membership.clone());
        Ok(membership)
    }

    async fn remove_membership(&self, user_id: i64, group_id: i64) -> AppResult<bool> {
        let mut memberships = Self::lock(self.memberships.lock())?;
        let before = memberships.len();
        memberships.retain(|m| !(m.user_id == user_id && m.group_id == group_id));
        Ok(memberships.len() < before)
    }

    async fn list_members(&self, group_id: i64) -> AppResult<Vec<User>> {
        let memberships = Self::lock(self.memberships.lock())?;
        let member_ids: Vec<i64> = memberships
            .iter()
            .filter(|m| m.group_id == group_id)
            .map(|m| m.user_id)
            .collect();
        drop(memberships);

        let users = Self::lock(self.users.lock())?;
        let mut members: Vec<User> = users
            .iter()
            .filter(|u| member_ids.contains(&u.id))
            .cloned()
            .collect();
        members.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        Ok(members)
    }

    async fn search_prefix(&self, prefix: &str, limit: i64) -> AppResult<Vec<Group>> {
        let groups = Self::lock(self.groups.lock())?;
        let mut hits: Vec<Group> = groups
            .iter()
            .filter(|g| g.name.starts_with(prefix))
            .cloned()
            .collect();
        hits.sort_by(|a, b| a.name.cmp(&b.name));
        hits.truncate(limit as usize);
        Ok(hits)
    }
}

#[async_trait]
impl FolderStore for MemoryEntityStore {
    async fn find_by_uuid(&self, uuid: Uuid) -> AppResult<Option<Folder>> {
        let folders = Self::lock(self.folders.lock())?;
        Ok(folders.iter().find(|f| f.uuid == uuid).cloned())
    }

    async fn default_folder_for(&self, creator_id: i64) -> AppResult<Option<Folder>> {
        let folders = Self::lock(self.folders.lock())?;
        Ok(folders
            .iter()
            .find(|f| f.creator_id == creator_id && f.is_default_folder)
            .cloned())
    }

    async fn create(&self, data: &CreateFolder) -> AppResult<Folder> {
        let now = Utc::now();
        let folder = Folder {
            id: self.next_id(),
            uuid: data.uuid,
            creator_id: data.creator_id,
            name: data.name.clone(),
            is_default_folder: data.is_default_folder,
            parent_uuid: data.parent_uuid,
            created_at: now,
            updated_at: now,
        };
        Self::lock(self.folders.lock())?.push(folder.clone());
        Ok(folder)
    }

    async fn delete_by_uuid(&self, uuid: Uuid) -> AppResult<bool> {
        let mut folders = Self::lock(self.folders.lock())?;
        let before = folders.len();
        folders.retain(|f| f.uuid != uuid);
        Ok(folders.len() < before)
    }

    async fn children_of(&self, parent_uuid: Uuid) -> AppResult<Vec<Folder>> {
        let folders = Self::lock(self.folders.lock())?;
        let mut children: Vec<Folder> = folders
            .iter()
            .filter(|f| f.parent_uuid == Some(parent_uuid))
            .cloned()
            .collect();
        children.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(children)
    }

    async fn delete_subtree(
        &self,
        folder_uuids: &[Uuid],
        file_uuids: &[Uuid],
    ) -> AppResult<(u64, u64)> {
        let mut files = Self::lock(self.files.lock())?;
        let files_before = files.len();
        files.retain(|f| !file_uuids.contains(&f.uuid));
        let files_removed = (files_before - files.len()) as u64;
        drop(files);

        let mut folders = Self::lock(self.folders.lock())?;
        let folders_before = folders.len();
        folders.retain(|f| !folder_uuids.contains(&f.uuid));
        let folders_removed = (folders_before - folders.len()) as u64;

        Ok((folders_removed, files_removed))
    }
}

#[async_trait]
impl FileStore for MemoryEntityStore {
    async fn find_by_uuid(&self, uuid: Uuid) -> AppResult<Option<File>> {
        let files = Self::lock(self.files.lock())?;
        Ok(files.iter().find(|f| f.uuid == uuid).cloned())
    }

    async fn create(&self, data: &CreateFile) -> AppResult<File> {
        let now = Utc::now();
        let file = File {
            id: self.next_id(),
            uuid: data.uuid,
            folder_uuid: data.folder_uuid,
            name: data.name.clone(),
            text_content: data.text_content.clone(),
            creator_id: data.creator_id,
            created_at: now,
            updated_at: now,
        };
        Self::lock(self.files.lock())?.push(file.clone());
        Ok(file)
    }

    async fn update_content(&self, uuid: Uuid, content: &str) -> AppResult<File> {
        let mut files = Self::lock(self.files.lock())?;
        let file = files
            .iter_mut()
            .find(|f| f.uuid == uuid)
            .ok_or_else(|| AppError::not_found("File not found"))?;
        file.text_content = content.to_string();
        file.updated_at = Utc::now();
        Ok(file.clone())
    }

    async fn delete_by_uuid(&self, uuid: Uuid) -> AppResult<bool> {
        let mut files = Self::lock(self.files.lock())?;
        let before = files.len();
        files.retain(|f| f.uuid != uuid);
        Ok(files.len() < before)
    }

    async fn files_in_folder(&self, folder_uuid: Uuid) -> AppResult<Vec<File>> {
        let files = Self::lock(self.files.lock())?;
        let mut hits: Vec<File> = files
            .iter()
            .filter(|f| f.folder_uuid == folder_uuid)
            .cloned()
            .collect();
        hits.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(hits)
    }
}

#[async_trait]
impl RepairStore for MemoryEntityStore {
    async fn record_orphans(&self, tuples: &[String]) -> AppResult<()> {
        Self::lock(self.orphans.lock())?.extend(tuples.iter().cloned());
        Ok(())
    }
}
