//! File endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Form, Json};
use serde::Deserialize;
use uuid::Uuid;

use trove_core::error::AppError;
use trove_entity::file::File;

use crate::extractors::ApiIdentity;
use crate::state::AppState;

/// Form body for file creation.
#[derive(Debug, Deserialize)]
pub struct CreateFileForm {
    /// File name.
    pub name: String,
    /// Initial content.
    #[serde(default)]
    pub content: String,
}

/// Form body for saving content.
#[derive(Debug, Deserialize)]
pub struct SaveFileForm {
    /// Replacement content.
    pub content: String,
}

/// `POST /api/create_file/{folder_uuid}`
pub async fn create(
    State(state): State<AppState>,
    ApiIdentity(ctx): ApiIdentity,
    Path(folder_uuid): Path<Uuid>,
    Form(form): Form<CreateFileForm>,
) -> Result<Json<File>, AppError> {
    let file = state
        .file_service
        .create_file(&ctx, folder_uuid, &form.name, &form.content)
        .await?;
    Ok(Json(file))
}

/// `GET /api/load_file/{file_uuid}`
pub async fn load(
    State(state): State<AppState>,
    ApiIdentity(ctx): ApiIdentity,
    Path(file_uuid): Path<Uuid>,
) -> Result<Json<File>, AppError> {
    let file = state.file_service.load_file(&ctx, file_uuid).await?;
    Ok(Json(file))
}

/// `POST /api/save_file/{file_uuid}`
pub async fn save(
    State(state): State<AppState>,
    ApiIdentity(ctx): ApiIdentity,
    Path(file_uuid): Path<Uuid>,
    Form(form): Form<SaveFileForm>,
) -> Result<Json<File>, AppError> {
    let file = state
        .file_service
        .save_file(&ctx, file_uuid, &form.content)
        .await?;
    Ok(Json(file))
}

/// `POST /api/delete_file/{file_uuid}`
pub async fn delete(
    State(state): State<AppState>,
    ApiIdentity(ctx): ApiIdentity,
    Path(file_uuid): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.file_service.delete_file(&ctx, file_uuid).await?;
    Ok(StatusCode::NO_CONTENT)
}
