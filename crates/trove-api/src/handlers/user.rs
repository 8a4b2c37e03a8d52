//! User directory endpoints.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use trove_core::error::AppError;
use trove_service::user::Suggestion;

use crate::extractors::ApiIdentity;
use crate::state::AppState;

/// Query for the share-target autocomplete.
#[derive(Debug, Deserialize)]
pub struct AutocompleteQuery {
    /// Case-sensitive name prefix.
    pub prefix: String,
}

/// `GET /api/autocomplete?prefix=`
pub async fn autocomplete(
    State(state): State<AppState>,
    ApiIdentity(_ctx): ApiIdentity,
    Query(query): Query<AutocompleteQuery>,
) -> Result<Json<Vec<Suggestion>>, AppError> {
    let suggestions = state.user_service.autocomplete(&query.prefix).await?;
    Ok(Json(suggestions))
}
