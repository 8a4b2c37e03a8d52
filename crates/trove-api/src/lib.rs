//! # trove-api
//!
//! HTTP surface for Trove: the axum router, application state, session
//! cookie handling, identity extractors, the identity-provider client,
//! and the handlers translating requests into service calls.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod identity;
pub mod router;
pub mod session;
pub mod state;

pub use router::build_router;
pub use state::AppState;
