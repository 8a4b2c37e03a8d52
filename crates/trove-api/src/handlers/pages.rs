//! Landing page.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::extractors::MaybeIdentity;
use crate::state::AppState;

/// What the landing page reports about the visitor.
#[derive(Debug, Serialize)]
pub struct LandingResponse {
    /// Whether a session is bound.
    pub authenticated: bool,
    /// Display name, when authenticated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Avatar URL, when authenticated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// Entry point of the visitor's workspace, when authenticated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_folder_uuid: Option<Uuid>,
    /// Where to go to log in, when not authenticated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_url: Option<String>,
}

/// `GET /` — session summary, or a pointer to `/login`.
pub async fn landing(
    State(_state): State<AppState>,
    MaybeIdentity(session): MaybeIdentity,
) -> Json<LandingResponse> {
    let response = match session {
        Some(ctx) => LandingResponse {
            authenticated: true,
            display_name: Some(ctx.display_name),
            avatar_url: ctx.avatar_url,
            default_folder_uuid: Some(ctx.default_folder_uuid),
            login_url: None,
        },
        None => LandingResponse {
            authenticated: false,
            display_name: None,
            avatar_url: None,
            default_folder_uuid: None,
            login_url: Some("/login".to_string()),
        },
    };
    Json(response)
}
