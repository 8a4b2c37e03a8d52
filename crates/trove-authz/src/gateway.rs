//! The relation tuple gateway.
//!
//! Single entry point for every tuple read and write in the
//! application. The gateway lazily initializes its backend exactly
//! once: the first caller runs the readiness probe while concurrent
//! callers await the same future, and a failed probe leaves the cell
//! empty so the next request retries instead of poisoning the process.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{debug, info};

use trove_core::config::authz::AuthzConfig;
use trove_core::error::AppError;
use trove_core::result::AppResult;

use crate::backend::{HttpTupleBackend, MemoryTupleBackend, TupleBackend};
use crate::error::GatewayError;
use crate::tuple::{ObjectRef, ObjectType, Relation, RelationTuple, SubjectRef};

/// Gateway over the configured tuple store backend.
pub struct TupleGateway {
    backend: Arc<dyn TupleBackend>,
    ready: OnceCell<()>,
}

impl TupleGateway {
    /// Build a gateway from configuration.
    pub fn from_config(config: &AuthzConfig) -> AppResult<Self> {
        let backend: Arc<dyn TupleBackend> = match config.backend.as_str() {
            "http" => Arc::new(HttpTupleBackend::new(config)?),
            "memory" => Arc::new(MemoryTupleBackend::new()),
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown authorization backend: '{other}'"
                )));
            }
        };
        info!(backend = %config.backend, "Tuple gateway configured");
        Ok(Self::with_backend(backend))
    }

    /// Build a gateway over an explicit backend.
    pub fn with_backend(backend: Arc<dyn TupleBackend>) -> Self {
        Self {
            backend,
            ready: OnceCell::new(),
        }
    }

    /// Probe the backend eagerly, typically at startup.
    pub async fn initialize(&self) -> AppResult<()> {
        self.ensure_ready().await?;
        Ok(())
    }

    /// Run the readiness probe at most once across concurrent callers.
    async fn ensure_ready(&self) -> Result<(), GatewayError> {
        self.ready
            .get_or_try_init(|| async {
                self.backend.ready().await?;
                info!("Tuple store ready");
                Ok(())
            })
            .await?;
        Ok(())
    }

    /// Record a stored relation.
    ///
    /// Computed relations are derived by the authorization model and
    /// must never be materialized as tuples.
    pub async fn relate(
        &self,
        subject: SubjectRef,
        relation: Relation,
        object: ObjectRef,
    ) -> AppResult<()> {
        if !relation.is_stored() {
            return Err(AppError::validation(format!(
                "Relation '{relation}' is computed and cannot be written"
            )));
        }
        self.ensure_ready().await?;

        let tuple = RelationTuple::new(subject, relation, object);
        debug!(%tuple, "Writing relation tuple");
        self.backend.write(&tuple).await?;
        Ok(())
    }

    /// Remove a stored relation. Surfaces `NotFound` when the tuple
    /// does not exist; callers decide whether that matters.
    pub async fn unrelate(
        &self,
        subject: SubjectRef,
        relation: Relation,
        object: ObjectRef,
    ) -> AppResult<()> {
        self.ensure_ready().await?;

        let tuple = RelationTuple::new(subject, relation, object);
        debug!(%tuple, "Deleting relation tuple");
        self.backend.delete(&tuple).await?;
        Ok(())
    }

    /// Evaluate a relation, including model expansion.
    pub async fn check(
        &self,
        subject: SubjectRef,
        relation: Relation,
        object: ObjectRef,
    ) -> AppResult<bool> {
        self.ensure_ready().await?;
        let allowed = self.backend.check(&subject, relation, &object).await?;
        debug!(%subject, %relation, %object, allowed, "Relation check");
        Ok(allowed)
    }

    /// Reverse query: every object of a type the subject holds the
    /// relation on.
    pub async fn list_accessible(
        &self,
        subject: SubjectRef,
        relation: Relation,
        object_type: ObjectType,
    ) -> AppResult<Vec<ObjectRef>> {
        self.ensure_ready().await?;
        let objects = self
            .backend
            .list_objects(&subject, relation, object_type)
            .await?;
        Ok(objects)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use uuid::Uuid;

    use super::*;

    /// Backend whose readiness probe fails a configured number of times
    /// before succeeding, counting every probe.
    struct FlakyBackend {
        inner: MemoryTupleBackend,
        probes: AtomicUsize,
        failures: usize,
    }

    impl FlakyBackend {
        fn new(failures: usize) -> Self {
            Self {
                inner: MemoryTupleBackend::new(),
                probes: AtomicUsize::new(0),
                failures,
            }
        }
    }

    #[async_trait]
    impl TupleBackend for FlakyBackend {
        async fn ready(&self) -> Result<(), GatewayError> {
            let n = self.probes.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                Err(GatewayError::Unavailable("probe failed".into()))
            } else {
                Ok(())
            }
        }

        async fn write(&self, tuple: &RelationTuple) -> Result<(), GatewayError> {
            self.inner.write(tuple).await
        }

        async fn delete(&self, tuple: &RelationTuple) -> Result<(), GatewayError> {
            self.inner.delete(tuple).await
        }

        async fn check(
            &self,
            subject: &SubjectRef,
            relation: Relation,
            object: &ObjectRef,
        ) -> Result<bool, GatewayError> {
            self.inner.check(subject, relation, object).await
        }

        async fn list_objects(
            &self,
            subject: &SubjectRef,
            relation: Relation,
            object_type: ObjectType,
        ) -> Result<Vec<ObjectRef>, GatewayError> {
            self.inner.list_objects(subject, relation, object_type).await
        }
    }

    #[tokio::test]
    async fn test_probe_runs_once_across_calls() {
        let backend = Arc::new(FlakyBackend::new(0));
        let gateway = TupleGateway::with_backend(backend.clone());

        let alice = SubjectRef::user(Uuid::new_v4());
        let folder = ObjectRef::folder(Uuid::new_v4());
        gateway.relate(alice, Relation::Owner, folder).await.unwrap();
        gateway.check(alice, Relation::CanRead, folder).await.unwrap();
        gateway
            .list_accessible(alice, Relation::Viewer, ObjectType::Folder)
            .await
            .unwrap();

        assert_eq!(backend.probes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_probe_retries_on_next_call() {
        let backend = Arc::new(FlakyBackend::new(1));
        let gateway = TupleGateway::with_backend(backend.clone());

        let alice = SubjectRef::user(Uuid::new_v4());
        let folder = ObjectRef::folder(Uuid::new_v4());

        let first = gateway.check(alice, Relation::CanRead, folder).await;
        assert!(first.is_err());

        // The cell stays empty after a failure, so the next call probes
        // again and succeeds.
        let second = gateway.check(alice, Relation::CanRead, folder).await;
        assert!(second.is_ok());
        assert_eq!(backend.probes.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_computed_relations_cannot_be_written() {
        let gateway = TupleGateway::with_backend(Arc::new(MemoryTupleBackend::new()));

        let alice = SubjectRef::user(Uuid::new_v4());
        let folder = ObjectRef::folder(Uuid::new_v4());
        let result = gateway.relate(alice, Relation::CanRead, folder).await;

        assert!(result.is_err());
    }
}
