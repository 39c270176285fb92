use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;

use storemint_core::quota::TenantStore;
use storemint_core::tenant::SubscriptionStatus;
use storemint_duckdb::CreateTenantParams;

use crate::{error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct CreateTenantRequest {
    /// Billing-side tenant id; generated when absent.
    pub id: Option<String>,
    pub plan_id: Option<String>,
    #[serde(default = "default_status")]
    pub subscription_status: SubscriptionStatus,
}

fn default_status() -> SubscriptionStatus {
    SubscriptionStatus::Inactive
}

/// `POST /api/tenants` — provisioning endpoint used by deploy tooling.
///
/// A referenced plan must exist: catching the dangling reference here keeps
/// `plan_not_configured` denies at request time down to genuine data bugs.
pub async fn create_tenant(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateTenantRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Some(plan_id) = &body.plan_id {
        if state.db.get_plan(plan_id).await?.is_none() {
            return Err(AppError::BadRequest(format!("unknown plan_id: {plan_id}")));
        }
    }

    let tenant = state
        .db
        .create_tenant(CreateTenantParams {
            id: body.id,
            plan_id: body.plan_id,
            subscription_status: body.subscription_status,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(json!({ "data": tenant }))))
}
