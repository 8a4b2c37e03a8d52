//! User registration, login, and directory search.

pub mod service;

pub use service::{IdentityProfile, Suggestion, SuggestionKind, UserService};
