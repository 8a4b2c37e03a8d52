//! Subtree collection.
//!
//! Deletion first collects the whole subtree, then removes it. The
//! walk is a queue-based BFS with a visited set, so each node is
//! visited exactly once and a corrupted (cyclic) parent graph cannot
//! loop it.

use std::collections::{HashSet, VecDeque};

use trove_core::result::AppResult;
use trove_entity::file::File;
use trove_entity::folder::Folder;
use trove_entity::store::{FileStore, FolderStore};

/// Everything under (and including) a folder.
#[derive(Debug, Default)]
pub struct Subtree {
    /// Folders in visit order, root first.
    pub folders: Vec<Folder>,
    /// Files of all visited folders.
    pub files: Vec<File>,
}

impl Subtree {
    /// Folder uuids, for batch deletion.
    pub fn folder_uuids(&self) -> Vec<uuid::Uuid> {
        self.folders.iter().map(|f| f.uuid).collect()
    }

    /// File uuids, for batch deletion.
    pub fn file_uuids(&self) -> Vec<uuid::Uuid> {
        self.files.iter().map(|f| f.uuid).collect()
    }
}

/// Collect a folder's subtree breadth-first.
pub async fn collect_subtree(
    folders: &dyn FolderStore,
    files: &dyn FileStore,
    root: Folder,
) -> AppResult<Subtree> {
    let mut subtree = Subtree::default();
    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();

    visited.insert(root.uuid);
    queue.push_back(root);

    while let Some(folder) = queue.pop_front() {
        subtree
            .files
            .extend(files.files_in_folder(folder.uuid).await?);

        for child in folders.children_of(folder.uuid).await? {
            if visited.insert(child.uuid) {
                queue.push_back(child);
            }
        }
        subtree.folders.push(folder);
    }

    Ok(subtree)
}
