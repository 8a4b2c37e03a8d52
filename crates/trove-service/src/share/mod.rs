//! Sharing folders and files with users and groups.

pub mod service;

pub use service::{ShareService, ShareTarget};
