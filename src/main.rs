//! Trove Server — shared workspace with relationship-based access control.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{fmt, EnvFilter};

use trove_api::state::AppState;
use trove_authz::{AccessDecider, TupleGateway};
use trove_core::config::AppConfig;
use trove_core::error::AppError;
use trove_database::repositories::{
    FileRepository, FolderRepository, GroupRepository, RepairRepository, UserRepository,
};
use trove_database::DatabasePool;
use trove_entity::store::{FileStore, FolderStore, GroupStore, RepairStore, UserStore};
use trove_service::{FileService, FolderService, GroupService, ShareService, UserService};

#[tokio::main]
async fn main() {
    let env = std::env::var("TROVE_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main server run function.
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Trove v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    let database = DatabasePool::connect(&config.database).await?;
    trove_database::migration::run_migrations(database.pool()).await?;
    let db_pool = database.into_pool();

    // ── Step 2: Authorization gateway ────────────────────────────
    let gateway = Arc::new(TupleGateway::from_config(&config.authz)?);
    if let Err(e) = gateway.initialize().await {
        // Not fatal: the gateway retries on first use.
        tracing::warn!("Authorization service not ready at startup: {e}");
    }
    let decider = AccessDecider::new(Arc::clone(&gateway));

    // ── Step 3: Repositories ─────────────────────────────────────
    let users: Arc<dyn UserStore> = Arc::new(UserRepository::new(db_pool.clone()));
    let groups: Arc<dyn GroupStore> = Arc::new(GroupRepository::new(db_pool.clone()));
    let folders: Arc<dyn FolderStore> = Arc::new(FolderRepository::new(db_pool.clone()));
    let files: Arc<dyn FileStore> = Arc::new(FileRepository::new(db_pool.clone()));
    let repair: Arc<dyn RepairStore> = Arc::new(RepairRepository::new(db_pool.clone()));

    // ── Step 4: Services ─────────────────────────────────────────
    let user_service = Arc::new(UserService::new(
        Arc::clone(&users),
        Arc::clone(&groups),
        Arc::clone(&folders),
        Arc::clone(&files),
        decider.clone(),
    ));
    let folder_service = Arc::new(FolderService::new(
        Arc::clone(&folders),
        Arc::clone(&files),
        Arc::clone(&users),
        Arc::clone(&repair),
        decider.clone(),
    ));
    let file_service = Arc::new(FileService::new(
        Arc::clone(&files),
        Arc::clone(&folders),
        Arc::clone(&users),
        Arc::clone(&repair),
        decider.clone(),
    ));
    let group_service = Arc::new(GroupService::new(
        Arc::clone(&groups),
        Arc::clone(&users),
        decider.clone(),
    ));
    let share_service = Arc::new(ShareService::new(
        Arc::clone(&folders),
        Arc::clone(&files),
        Arc::clone(&groups),
        Arc::clone(&users),
        decider.clone(),
    ));

    // ── Step 5: HTTP surface ─────────────────────────────────────
    let sessions = trove_api::session::SessionSigner::new(&config.session);
    let identity = trove_api::identity::IdentityClient::new(&config.identity);

    let state = AppState {
        config: Arc::new(config.clone()),
        db_pool,
        identity,
        sessions,
        user_service,
        folder_service,
        file_service,
        group_service,
        share_service,
    };
    let app = trove_api::build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("Trove server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    tracing::info!("Trove server shut down gracefully");
    Ok(())
}

/// Resolve on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
