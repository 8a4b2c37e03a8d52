//! Health endpoint.

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::state::AppState;

/// `GET /api/health` — liveness plus a database ping.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let database = trove_database::ping(&state.db_pool).await;

    Json(json!({
        "status": if database { "ok" } else { "degraded" },
        "database": database,
    }))
}
