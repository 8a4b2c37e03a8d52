//! # trove-entity
//!
//! Domain entity models for Trove. Every struct in this crate represents
//! a database table row or a domain value object. All entities derive
//! `Debug`, `Clone`, `Serialize`, `Deserialize`, and database entities
//! additionally derive `sqlx::FromRow`.
//!
//! The `store` module defines the async contracts the entity store must
//! satisfy; `trove-database` implements them against PostgreSQL.

pub mod file;
pub mod folder;
pub mod group;
pub mod store;
pub mod user;
