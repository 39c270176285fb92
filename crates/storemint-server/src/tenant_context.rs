use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde_json::json;

/// Tenant identity extracted from the bearer token on every request.
///
/// The token payload contains:
/// ```json
/// { "sub": "usr_abc", "tid": "ten_xyz" }
/// ```
///
/// `FromRequestParts` returns:
/// - `401` if the Authorization header is missing or the token is malformed.
/// - `403 "tenant context required"` if the token has no `tid` claim.
#[derive(Debug, Clone)]
pub struct TenantContext {
    /// Tenant ID (`tid`), used as the admission scope in all queries.
    pub tenant_id: String,
    /// User ID (`sub`).
    pub user_id: String,
}

/// Rejection returned by [`TenantContext`]'s `FromRequestParts` impl.
pub enum TenantError {
    Unauthenticated,
    Forbidden(String),
}

impl IntoResponse for TenantError {
    fn into_response(self) -> Response {
        let (status, code, msg) = match self {
            TenantError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Unauthorized".to_string(),
            ),
            TenantError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg),
        };
        (
            status,
            Json(json!({ "error": { "code": code, "message": msg, "field": null } })),
        )
            .into_response()
    }
}

impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = TenantError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Extract Authorization: Bearer <token>
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(TenantError::Unauthenticated)?;

        let token = auth
            .strip_prefix("Bearer ")
            .ok_or(TenantError::Unauthenticated)?;

        // Decode the JWT payload without re-verifying the signature.
        // The auth proxy in front of this service has already verified the
        // token; only the payload claims are needed here.
        let claims = decode_payload(token).ok_or(TenantError::Unauthenticated)?;

        let user_id = claims
            .get("sub")
            .and_then(|v| v.as_str())
            .ok_or(TenantError::Unauthenticated)?
            .to_string();

        let tenant_id = claims
            .get("tid")
            .and_then(|v| v.as_str())
            .filter(|tid| !tid.is_empty())
            .ok_or_else(|| TenantError::Forbidden("tenant context required".to_string()))?
            .to_string();

        Ok(TenantContext { tenant_id, user_id })
    }
}

/// Decode the payload section of a JWT (base64url, middle segment) without
/// verifying the signature. The upstream auth proxy is responsible for
/// verification.
fn decode_payload(token: &str) -> Option<serde_json::Value> {
    let payload_b64 = token.split('.').nth(1)?;
    // URL_SAFE_NO_PAD handles the base64url alphabet and missing padding.
    let bytes = URL_SAFE_NO_PAD.decode(payload_b64).ok()?;
    serde_json::from_slice(&bytes).ok()
}
