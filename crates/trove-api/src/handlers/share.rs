//! Share endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Form;
use serde::Deserialize;
use uuid::Uuid;

use trove_core::error::AppError;
use trove_service::ShareTarget;

use crate::extractors::ApiIdentity;
use crate::state::AppState;

/// Form body for share grants.
#[derive(Debug, Deserialize)]
pub struct ShareForm {
    /// `"user"` or `"group"`.
    pub target_kind: String,
    /// The target's public uuid.
    pub target_uuid: Uuid,
    /// Grant write access instead of read-only.
    #[serde(default)]
    pub allow_write: bool,
}

impl ShareForm {
    fn target(&self) -> Result<ShareTarget, AppError> {
        match self.target_kind.as_str() {
            "user" => Ok(ShareTarget::User(self.target_uuid)),
            "group" => Ok(ShareTarget::Group(self.target_uuid)),
            other => Err(AppError::validation(format!(
                "Unknown share target kind: '{other}'"
            ))),
        }
    }
}

/// `POST /api/share/folder/{folder_uuid}`
pub async fn share_folder(
    State(state): State<AppState>,
    ApiIdentity(ctx): ApiIdentity,
    Path(folder_uuid): Path<Uuid>,
    Form(form): Form<ShareForm>,
) -> Result<StatusCode, AppError> {
    state
        .share_service
        .share_folder(&ctx, folder_uuid, form.target()?, form.allow_write)
        .await?;
    Ok(StatusCode::CREATED)
}

/// `POST /api/share/file/{file_uuid}`
pub async fn share_file(
    State(state): State<AppState>,
    ApiIdentity(ctx): ApiIdentity,
    Path(file_uuid): Path<Uuid>,
    Form(form): Form<ShareForm>,
) -> Result<StatusCode, AppError> {
    state
        .share_service
        .share_file(&ctx, file_uuid, form.target()?, form.allow_write)
        .await?;
    Ok(StatusCode::CREATED)
}
