//! Tuple store backends.
//!
//! The gateway talks to a backend through the [`TupleBackend`] trait.
//! Production uses the HTTP client against the external Authorization
//! Service; development and tests use the embedded in-memory evaluator.
//! Both expose the same observable contract.

pub mod http;
pub mod memory;

use async_trait::async_trait;

use crate::error::GatewayError;
use crate::tuple::{ObjectRef, ObjectType, Relation, RelationTuple, SubjectRef};

pub use http::HttpTupleBackend;
pub use memory::MemoryTupleBackend;

/// Transport-level operations against a tuple store.
///
/// Relation expansion rules (e.g. "can_read on a file if viewer on its
/// parent folder") live in the store's configured authorization model,
/// not in the callers of this trait.
#[async_trait]
pub trait TupleBackend: Send + Sync + 'static {
    /// One-time readiness probe: reads the active authorization model
    /// and binds store/model identifiers.
    async fn ready(&self) -> Result<(), GatewayError>;

    /// Record a tuple. Declarative: writing an identical tuple twice is
    /// a no-op, not an error.
    async fn write(&self, tuple: &RelationTuple) -> Result<(), GatewayError>;

    /// Remove a tuple. Fails with [`GatewayError::NotFound`] if absent.
    async fn delete(&self, tuple: &RelationTuple) -> Result<(), GatewayError>;

    /// Evaluate whether the relation holds, possibly transitively via
    /// the store's model expansion.
    async fn check(
        &self,
        subject: &SubjectRef,
        relation: Relation,
        object: &ObjectRef,
    ) -> Result<bool, GatewayError>;

    /// Reverse query: all objects of a type the subject holds the
    /// relation on.
    async fn list_objects(
        &self,
        subject: &SubjectRef,
        relation: Relation,
        object_type: ObjectType,
    ) -> Result<Vec<ObjectRef>, GatewayError>;
}
