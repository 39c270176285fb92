use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use chrono::Utc;
use serde_json::json;

use crate::{error::AppError, state::AppState, tenant_context::TenantContext};

/// `GET /api/usage` — current-month usage snapshot for the authenticated
/// tenant: plan name, subscription status, the billing window, and per-kind
/// used/limit pairs (`limit: null` means unlimited).
#[tracing::instrument(skip_all, fields(tenant_id = %ctx.tenant_id))]
pub async fn get_usage(
    State(state): State<Arc<AppState>>,
    ctx: TenantContext,
) -> Result<impl IntoResponse, AppError> {
    match state.quota.usage_report(&ctx.tenant_id, Utc::now()).await? {
        Ok(report) => Ok(Json(json!({ "data": report }))),
        Err(reason) => Err(AppError::from_deny(reason)),
    }
}
