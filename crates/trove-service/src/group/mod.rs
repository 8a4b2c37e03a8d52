//! Group management: creation, membership, roles.

pub mod service;

pub use service::{GroupRoster, GroupService, RosterEntry};
