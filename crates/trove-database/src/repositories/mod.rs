//! Repository implementations for all Trove entities.

pub mod file;
pub mod folder;
pub mod group;
pub mod repair;
pub mod user;

pub use file::FileRepository;
pub use folder::FolderRepository;
pub use group::GroupRepository;
pub use repair::RepairRepository;
pub use user::UserRepository;
