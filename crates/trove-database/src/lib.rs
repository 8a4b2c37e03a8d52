//! # trove-database
//!
//! PostgreSQL connection management and the concrete repository
//! implementations behind the entity-store traits in `trove-entity`.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::{ping, DatabasePool};
