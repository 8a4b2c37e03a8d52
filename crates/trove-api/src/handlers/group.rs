//! Group endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Form, Json};
use serde::Deserialize;
use uuid::Uuid;

use trove_core::error::AppError;
use trove_entity::group::{Group, GroupRole};
use trove_service::group::GroupRoster;

use crate::extractors::ApiIdentity;
use crate::state::AppState;

/// Form body for group creation.
#[derive(Debug, Deserialize)]
pub struct CreateGroupForm {
    /// Group name.
    pub name: String,
}

/// Form body for inviting a member.
#[derive(Debug, Deserialize)]
pub struct AddMemberForm {
    /// The invited user's public uuid.
    pub member_uuid: Uuid,
    /// Role to grant; defaults to plain membership.
    #[serde(default)]
    pub role: Option<String>,
}

/// Form body for demoting an admin.
#[derive(Debug, Deserialize)]
pub struct DemoteForm {
    /// The member losing the admin role.
    pub member_uuid: Uuid,
}

/// `POST /api/create_group`
pub async fn create(
    State(state): State<AppState>,
    ApiIdentity(ctx): ApiIdentity,
    Form(form): Form<CreateGroupForm>,
) -> Result<Json<Group>, AppError> {
    let group = state.group_service.create_group(&ctx, &form.name).await?;
    Ok(Json(group))
}

/// `GET /api/group/{group_uuid}`
pub async fn roster(
    State(state): State<AppState>,
    ApiIdentity(ctx): ApiIdentity,
    Path(group_uuid): Path<Uuid>,
) -> Result<Json<GroupRoster>, AppError> {
    let roster = state.group_service.roster(&ctx, group_uuid).await?;
    Ok(Json(roster))
}

/// `POST /api/group/add/{group_uuid}`
pub async fn add_member(
    State(state): State<AppState>,
    ApiIdentity(ctx): ApiIdentity,
    Path(group_uuid): Path<Uuid>,
    Form(form): Form<AddMemberForm>,
) -> Result<StatusCode, AppError> {
    let role = match form.role.as_deref() {
        None | Some("") => GroupRole::Member,
        Some(name) => name.parse()?,
    };
    state
        .group_service
        .add_member(&ctx, group_uuid, form.member_uuid, role)
        .await?;
    Ok(StatusCode::CREATED)
}

/// `POST /api/group/demote/{group_uuid}`
pub async fn demote(
    State(state): State<AppState>,
    ApiIdentity(ctx): ApiIdentity,
    Path(group_uuid): Path<Uuid>,
    Form(form): Form<DemoteForm>,
) -> Result<StatusCode, AppError> {
    state
        .group_service
        .demote_admin(&ctx, group_uuid, form.member_uuid)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
