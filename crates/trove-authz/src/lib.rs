//! # trove-authz
//!
//! The relationship-based authorization layer. Permissions are
//! (subject, relation, object) tuples held by an external Authorization
//! Service; this crate provides:
//!
//! - the tuple vocabulary ([`tuple`]): subject/object references and the
//!   canonical relation set,
//! - the [`gateway`]: the single point of contact with the service, with
//!   guarded one-time initialization,
//! - pluggable [`backend`]s: the HTTP client speaking the service
//!   protocol, and an embedded in-memory evaluator for development and
//!   tests,
//! - the [`decision`] layer translating domain actions into relation
//!   checks, including effective-role precedence and reverse listing.

pub mod backend;
pub mod decision;
pub mod error;
pub mod gateway;
pub mod tuple;

pub use decision::{AccessDecider, Action};
pub use error::GatewayError;
pub use gateway::TupleGateway;
pub use tuple::{ObjectRef, ObjectType, Relation, RelationTuple, SubjectRef};
