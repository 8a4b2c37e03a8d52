//! # trove-service
//!
//! Business logic service layer for Trove. Each service orchestrates the
//! entity store and the authorization gateway to implement
//! application-level use cases, keeping the two stores consistent:
//! entity writes come first, paired tuple writes second, with
//! compensation when the pair cannot be completed.
//!
//! Services follow constructor injection — all dependencies are provided
//! at construction time via `Arc` references.

pub mod context;
pub mod file;
pub mod folder;
pub mod group;
pub mod share;
pub mod user;

// Shared by the service unit tests and, behind the `test-support`
// feature, by the workspace integration tests.
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use context::SessionContext;
pub use file::FileService;
pub use folder::{FolderService, ListingEntry};
pub use group::GroupService;
pub use share::{ShareService, ShareTarget};
pub use user::{IdentityProfile, UserService};
