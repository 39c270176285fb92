use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use storemint_core::quota::{Decision, ResourceKind};
use storemint_duckdb::CreateStaffParams;

use crate::{error::AppError, state::AppState, tenant_context::TenantContext};

#[derive(Debug, Deserialize)]
pub struct CreateStaffRequest {
    pub email: String,
    pub name: String,
}

/// `POST /api/staff` — add a staff member for the authenticated tenant.
///
/// Gated by the quota engine against the plan's `maxStaff` limit (all-time
/// count). The admission check and the insert are separate reads/writes, so
/// the limit is soft under concurrent requests.
#[tracing::instrument(skip_all, fields(tenant_id = %ctx.tenant_id))]
pub async fn create_staff(
    State(state): State<Arc<AppState>>,
    ctx: TenantContext,
    Json(body): Json<CreateStaffRequest>,
) -> Result<impl IntoResponse, AppError> {
    if body.email.trim().is_empty() {
        return Err(AppError::BadRequest("email must not be empty".to_string()));
    }
    if body.name.trim().is_empty() {
        return Err(AppError::BadRequest("name must not be empty".to_string()));
    }

    match state
        .quota
        .decide(&ctx.tenant_id, ResourceKind::Staff, Utc::now())
        .await?
    {
        Decision::Admit => {}
        Decision::Deny(reason) => return Err(AppError::from_deny(reason)),
    }

    let staff = state
        .db
        .create_staff(
            &ctx.tenant_id,
            CreateStaffParams {
                email: body.email,
                name: body.name,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(json!({ "data": staff }))))
}
