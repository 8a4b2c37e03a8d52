//! Folder operations: creation, listing, and subtree deletion.

pub mod service;
pub mod traversal;

pub use service::{DeletionSummary, EntryKind, FolderListing, FolderService, ListingEntry};
pub use traversal::{collect_subtree, Subtree};
