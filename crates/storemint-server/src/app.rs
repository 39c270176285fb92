use std::sync::Arc;

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{routes, state::AppState};

/// CORS policy from `Config.cors_origins`.
///
/// An empty list (the default) allows any origin — the API is called from
/// tenant storefront admin UIs on their own domains. Deployments that set
/// `STOREMINT_CORS_ORIGINS` get an explicit allow-list; entries that are not
/// valid header values are skipped with a warning rather than failing boot.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin, "Skipping invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(parsed)
}

/// Construct the axum [`Router`] with all routes and middleware attached.
///
/// Middleware is applied in outer-to-inner order (outermost runs first on
/// request, last on response):
///
/// 1. `TraceLayer` — structured request/response logging via `tracing`.
/// 2. `CorsLayer` — see [`cors_layer`].
///
/// The quota gate is not a layer: creation handlers invoke the engine
/// directly so each endpoint picks its resource kind and every deny carries
/// its specific reason.
pub fn build_app(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.cors_origins);
    Router::new()
        .route("/health", get(routes::health::health))
        .route("/api/staff", post(routes::staff::create_staff))
        .route("/api/orders", post(routes::orders::create_order))
        .route("/api/usage", get(routes::usage::get_usage))
        .route("/api/tenants", post(routes::tenants::create_tenant))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
