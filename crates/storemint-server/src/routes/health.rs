use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

use crate::{error::AppError, state::AppState};

/// `GET /health` — liveness probe. Pings the database so a wedged storage
/// backend surfaces as unhealthy rather than silently failing admissions.
pub async fn health(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    state.db.ping().await?;
    Ok(Json(json!({ "status": "ok" })))
}
