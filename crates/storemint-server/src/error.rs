use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use storemint_core::quota::DenyReason;

/// Application-level errors that map directly to HTTP responses.
///
/// Every variant implements [`IntoResponse`] so axum handlers can use
/// `Result<impl IntoResponse, AppError>` as their return type. The quota
/// engine's deny reasons are translated here and nowhere else — the engine
/// itself is transport-agnostic.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    /// Tenant exists but has no resolvable plan — an operator problem, kept
    /// distinct from a quota breach so it is actionable.
    #[error("tenant has no subscription plan configured")]
    PlanNotConfigured,

    #[error("subscription inactive")]
    SubscriptionInactive,

    /// Usage is at or above the plan ceiling.
    #[error("{message}")]
    PlanLimitExceeded { message: String },

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Translate an admission deny into its response. This is the only place
    /// the decision → HTTP contract lives.
    pub fn from_deny(reason: DenyReason) -> Self {
        match reason {
            DenyReason::TenantNotFound => AppError::NotFound("tenant not found".to_string()),
            DenyReason::PlanNotFound => AppError::PlanNotConfigured,
            DenyReason::SubscriptionInactive => AppError::SubscriptionInactive,
            DenyReason::LimitExceeded {
                plan,
                kind,
                limit,
                used: _,
            } => AppError::PlanLimitExceeded {
                message: format!(
                    "plan '{plan}' limited to {limit} {}; upgrade to add more",
                    kind.quota_noun()
                ),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "validation_error", msg.clone())
            }
            AppError::PlanNotConfigured => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "plan_not_configured",
                "tenant has no subscription plan configured".to_string(),
            ),
            AppError::SubscriptionInactive => (
                StatusCode::FORBIDDEN,
                "subscription_inactive",
                "subscription inactive; renew or upgrade to continue placing orders"
                    .to_string(),
            ),
            AppError::PlanLimitExceeded { message } => {
                (StatusCode::FORBIDDEN, "plan_limit_exceeded", message.clone())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error".to_string(),
                )
            }
        };

        (
            status,
            Json(json!({
                "error": {
                    "code": code,
                    "message": message,
                    "field": null
                }
            })),
        )
            .into_response()
    }
}
