//! Group and membership entities.

pub mod model;
pub mod role;

pub use model::{CreateGroup, Group, GroupMembership};
pub use role::GroupRole;
