//! Request extractors.

pub mod auth;

pub use auth::{ApiIdentity, MaybeIdentity, PageIdentity};
