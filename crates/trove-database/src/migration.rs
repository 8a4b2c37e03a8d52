//! Embedded schema migrations.

use sqlx::migrate::Migrator;
use sqlx::PgPool;
use tracing::info;

use trove_core::error::{AppError, ErrorKind};
use trove_core::result::AppResult;

/// Migration scripts compiled in from `migrations/` at the workspace root.
static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Bring the schema up to the latest revision.
pub async fn run_migrations(pool: &PgPool) -> AppResult<()> {
    MIGRATOR.run(pool).await.map_err(|e| {
        AppError::with_source(ErrorKind::Database, format!("Migration failed: {e}"), e)
    })?;
    info!(revisions = MIGRATOR.iter().count(), "Database schema up to date");
    Ok(())
}
