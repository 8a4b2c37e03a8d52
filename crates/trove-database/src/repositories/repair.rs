//! Authorization repair ledger repository.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::warn;

use trove_core::error::{AppError, ErrorKind};
use trove_core::result::AppResult;
use trove_entity::store::RepairStore;

/// Repository for the `authz_repair` ledger. Entity deletion commits
/// before tuple cleanup; when a tuple delete then fails, the orphaned
/// tuple is parked here for a reconciliation sweep.
#[derive(Debug, Clone)]
pub struct RepairRepository {
    pool: PgPool,
}

impl RepairRepository {
    /// Create a new repair repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RepairStore for RepairRepository {
    async fn record_orphans(&self, tuples: &[String]) -> AppResult<()> {
        if tuples.is_empty() {
            return Ok(());
        }
        warn!(count = tuples.len(), "Recording orphaned authorization tuples");

        sqlx::query("INSERT INTO authz_repair (tuple) SELECT unnest($1::text[])")
            .bind(tuples)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to record orphaned tuples", e)
            })?;
        Ok(())
    }
}
