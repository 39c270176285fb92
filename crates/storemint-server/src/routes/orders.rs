use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use storemint_core::quota::{Decision, ResourceKind};
use storemint_duckdb::CreateOrderParams;

use crate::{error::AppError, state::AppState, tenant_context::TenantContext};

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub total_cents: i64,
    pub currency: Option<String>,
}

/// `POST /api/orders` — record an order for the authenticated tenant.
///
/// Gated by the quota engine: the subscription must be active/trialing, and
/// the current UTC calendar-month order count must be below the plan's
/// `maxOrdersPerMonth`. An unlimited plan admits without counting.
#[tracing::instrument(skip_all, fields(tenant_id = %ctx.tenant_id))]
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    ctx: TenantContext,
    Json(body): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, AppError> {
    if body.total_cents < 0 {
        return Err(AppError::BadRequest(
            "total_cents must not be negative".to_string(),
        ));
    }
    if let Some(currency) = &body.currency {
        if currency.len() != 3 {
            return Err(AppError::BadRequest(
                "currency must be a 3-letter code".to_string(),
            ));
        }
    }

    match state
        .quota
        .decide(&ctx.tenant_id, ResourceKind::Order, Utc::now())
        .await?
    {
        Decision::Admit => {}
        Decision::Deny(reason) => return Err(AppError::from_deny(reason)),
    }

    let order = state
        .db
        .create_order(
            &ctx.tenant_id,
            CreateOrderParams {
                total_cents: body.total_cents,
                currency: body.currency,
                created_at: None,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(json!({ "data": order }))))
}
