//! Route definitions for the Trove HTTP surface.
//!
//! Everything under `/api` requires a bound session and answers JSON;
//! the page routes (`/`, `/login`, `/callback`, `/logout`) drive the
//! browser flow.

use axum::routing::{get, post};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(folder_routes())
        .merge(file_routes())
        .merge(group_routes())
        .merge(share_routes())
        .merge(directory_routes())
        .merge(health_routes());

    let page_routes = Router::new()
        .route("/", get(handlers::pages::landing))
        .route("/login", get(handlers::auth::login))
        .route("/callback", get(handlers::auth::callback))
        .route("/logout", get(handlers::auth::logout));

    Router::new()
        .nest("/api", api_routes)
        .merge(page_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Folder listing, creation, deletion.
fn folder_routes() -> Router<AppState> {
    Router::new()
        .route("/list/{folder_uuid}", get(handlers::folder::list))
        .route("/create_folder/{folder_uuid}", post(handlers::folder::create))
        .route("/delete_folder/{folder_uuid}", post(handlers::folder::delete))
}

/// File CRUD.
fn file_routes() -> Router<AppState> {
    Router::new()
        .route("/create_file/{folder_uuid}", post(handlers::file::create))
        .route("/load_file/{file_uuid}", get(handlers::file::load))
        .route("/save_file/{file_uuid}", post(handlers::file::save))
        .route("/delete_file/{file_uuid}", post(handlers::file::delete))
}

/// Group creation and membership.
fn group_routes() -> Router<AppState> {
    Router::new()
        .route("/create_group", post(handlers::group::create))
        .route("/group/{group_uuid}", get(handlers::group::roster))
        .route("/group/add/{group_uuid}", post(handlers::group::add_member))
        .route("/group/demote/{group_uuid}", post(handlers::group::demote))
}

/// Share grants.
fn share_routes() -> Router<AppState> {
    Router::new()
        .route("/share/folder/{folder_uuid}", post(handlers::share::share_folder))
        .route("/share/file/{file_uuid}", post(handlers::share::share_file))
}

/// Share-target autocomplete.
fn directory_routes() -> Router<AppState> {
    Router::new().route("/autocomplete", get(handlers::user::autocomplete))
}

/// Health probe.
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
