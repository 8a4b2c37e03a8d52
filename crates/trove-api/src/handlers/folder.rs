//! Folder endpoints.

use axum::extract::{Path, State};
use axum::{Form, Json};
use serde::Deserialize;
use uuid::Uuid;

use trove_core::error::AppError;
use trove_service::folder::{DeletionSummary, FolderListing};
use trove_entity::folder::Folder;

use crate::extractors::ApiIdentity;
use crate::state::AppState;

/// Form body for folder creation.
#[derive(Debug, Deserialize)]
pub struct CreateFolderForm {
    /// New folder name.
    pub name: String,
}

/// `GET /api/list/{folder_uuid}`
pub async fn list(
    State(state): State<AppState>,
    ApiIdentity(ctx): ApiIdentity,
    Path(folder_uuid): Path<Uuid>,
) -> Result<Json<FolderListing>, AppError> {
    let listing = state.folder_service.list(&ctx, folder_uuid).await?;
    Ok(Json(listing))
}

/// `POST /api/create_folder/{folder_uuid}`
pub async fn create(
    State(state): State<AppState>,
    ApiIdentity(ctx): ApiIdentity,
    Path(parent_uuid): Path<Uuid>,
    Form(form): Form<CreateFolderForm>,
) -> Result<Json<Folder>, AppError> {
    let folder = state
        .folder_service
        .create_folder(&ctx, parent_uuid, &form.name)
        .await?;
    Ok(Json(folder))
}

/// `POST /api/delete_folder/{folder_uuid}`
pub async fn delete(
    State(state): State<AppState>,
    ApiIdentity(ctx): ApiIdentity,
    Path(folder_uuid): Path<Uuid>,
) -> Result<Json<DeletionSummary>, AppError> {
    let summary = state.folder_service.delete_folder(&ctx, folder_uuid).await?;
    Ok(Json(summary))
}
