//! End-to-end admission tests: bearer token → quota gate → storage.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{Datelike, Duration, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use storemint_core::config::Config;
use storemint_core::plan::{Limit, PlanLimits};
use storemint_core::tenant::SubscriptionStatus;
use storemint_duckdb::{CreateOrderParams, CreateTenantParams, DuckDbBackend};
use storemint_server::app::build_app;
use storemint_server::state::AppState;

fn test_config() -> Config {
    Config {
        port: 0,
        data_dir: "/tmp/storemint-test".to_string(),
        duckdb_memory_limit: "1GB".to_string(),
        cors_origins: vec![],
    }
}

async fn setup() -> (Arc<AppState>, axum::Router) {
    let db = DuckDbBackend::open_in_memory().expect("in-memory DuckDB");
    let state = Arc::new(AppState::new(db, test_config()));
    let app = build_app(Arc::clone(&state));
    (state, app)
}

/// Unsigned bearer token carrying the claims the auth proxy would forward.
fn token(tenant_id: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none"}"#);
    let payload = URL_SAFE_NO_PAD.encode(json!({ "sub": "usr_test", "tid": tenant_id }).to_string());
    format!("{header}.{payload}.sig")
}

async fn seed_tenant(
    state: &AppState,
    plan_id: Option<&str>,
    status: SubscriptionStatus,
) -> String {
    state
        .db
        .create_tenant(CreateTenantParams {
            id: None,
            plan_id: plan_id.map(str::to_string),
            subscription_status: status,
        })
        .await
        .expect("create tenant")
        .id
}

fn post_json(uri: &str, tenant_id: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("authorization", format!("Bearer {}", token(tenant_id)))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("build request")
}

fn post_staff(tenant_id: &str, email: &str) -> Request<Body> {
    post_json(
        "/api/staff",
        tenant_id,
        json!({ "email": email, "name": "Test Person" }),
    )
}

fn post_order(tenant_id: &str) -> Request<Body> {
    post_json("/api/orders", tenant_id, json!({ "total_cents": 1999 }))
}

async fn json_body(response: axum::http::Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("parse JSON")
}

// ============================================================
// Auth boundary
// ============================================================

#[tokio::test]
async fn test_staff_creation_requires_bearer_token() {
    let (_state, app) = setup().await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/staff")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"email":"x@example.com","name":"X"}"#))
        .expect("build request");

    let response = app.oneshot(request).await.expect("request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_without_tenant_claim_is_forbidden() {
    let (_state, app) = setup().await;

    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none"}"#);
    let payload = URL_SAFE_NO_PAD.encode(r#"{"sub":"usr_test"}"#);
    let request = Request::builder()
        .method("POST")
        .uri("/api/staff")
        .header("authorization", format!("Bearer {header}.{payload}.sig"))
        .header("content-type", "application/json")
        .body(Body::from(r#"{"email":"x@example.com","name":"X"}"#))
        .expect("build request");

    let response = app.oneshot(request).await.expect("request");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = json_body(response).await;
    assert_eq!(body["error"]["message"], "tenant context required");
}

// ============================================================
// Configuration errors are distinct from quota denials
// ============================================================

#[tokio::test]
async fn test_unknown_tenant_is_404() {
    let (_state, app) = setup().await;

    let response = app
        .oneshot(post_staff("ten_ghost", "x@example.com"))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "not_found");
    assert_eq!(body["error"]["message"], "tenant not found");
}

#[tokio::test]
async fn test_tenant_without_plan_is_configuration_error() {
    let (state, app) = setup().await;
    let tenant = seed_tenant(&state, None, SubscriptionStatus::Active).await;

    let response = app
        .oneshot(post_staff(&tenant, "x@example.com"))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "plan_not_configured");
}

// ============================================================
// Staff limit (all-time count)
// ============================================================

#[tokio::test]
async fn test_staff_limit_denies_fourth_member_on_free_plan() {
    let (state, app) = setup().await;
    let tenant = seed_tenant(&state, Some("plan_free"), SubscriptionStatus::Active).await;

    for i in 0..3 {
        let response = app
            .clone()
            .oneshot(post_staff(&tenant, &format!("s{i}@example.com")))
            .await
            .expect("request");
        assert_eq!(response.status(), StatusCode::CREATED, "staff {i} should be admitted");
    }

    let response = app
        .oneshot(post_staff(&tenant, "s3@example.com"))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "plan_limit_exceeded");
    assert_eq!(
        body["error"]["message"],
        "plan 'free' limited to 3 staff; upgrade to add more"
    );
}

#[tokio::test]
async fn test_zero_staff_limit_denies_first_member() {
    let (state, app) = setup().await;
    state
        .db
        .upsert_plan(
            "plan_solo",
            "solo",
            PlanLimits {
                max_staff: Limit::AtMost(0),
                max_orders_per_month: Limit::Unlimited,
            },
        )
        .await
        .expect("upsert plan");
    let tenant = seed_tenant(&state, Some("plan_solo"), SubscriptionStatus::Active).await;

    let response = app
        .oneshot(post_staff(&tenant, "x@example.com"))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "plan_limit_exceeded");
}

// ============================================================
// Order limit (current-month window) and subscription status
// ============================================================

#[tokio::test]
async fn test_inactive_subscription_blocks_orders_but_not_staff() {
    let (state, app) = setup().await;
    let tenant = seed_tenant(&state, Some("plan_pro"), SubscriptionStatus::Inactive).await;

    let response = app.clone().oneshot(post_order(&tenant)).await.expect("request");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "subscription_inactive");

    // Staff management stays available to lapsed tenants.
    let response = app
        .oneshot(post_staff(&tenant, "x@example.com"))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_unlimited_order_plan_admits_past_free_tier_volume() {
    let (state, app) = setup().await;
    let tenant = seed_tenant(&state, Some("plan_pro"), SubscriptionStatus::Active).await;

    // Backfill well past the free tier's monthly ceiling.
    for _ in 0..150 {
        state
            .db
            .create_order(
                &tenant,
                CreateOrderParams {
                    total_cents: 500,
                    currency: None,
                    created_at: None,
                },
            )
            .await
            .expect("backfill order");
    }

    let response = app.oneshot(post_order(&tenant)).await.expect("request");
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_order_limit_counts_only_current_month() {
    let (state, app) = setup().await;
    state
        .db
        .upsert_plan(
            "plan_tiny",
            "tiny",
            PlanLimits {
                max_staff: Limit::Unlimited,
                max_orders_per_month: Limit::AtMost(1),
            },
        )
        .await
        .expect("upsert plan");
    let tenant = seed_tenant(&state, Some("plan_tiny"), SubscriptionStatus::Active).await;

    // An order from last month must not count against this month's window.
    let now = Utc::now();
    let last_month = now - Duration::days(i64::from(now.day()) + 1);
    state
        .db
        .create_order(
            &tenant,
            CreateOrderParams {
                total_cents: 100,
                currency: None,
                created_at: Some(last_month),
            },
        )
        .await
        .expect("backfill order");

    let response = app.clone().oneshot(post_order(&tenant)).await.expect("request");
    assert_eq!(response.status(), StatusCode::CREATED);

    // The admitted order fills the window; the next one is refused.
    let response = app.oneshot(post_order(&tenant)).await.expect("request");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = json_body(response).await;
    assert_eq!(
        body["error"]["message"],
        "plan 'tiny' limited to 1 orders per month; upgrade to add more"
    );
}

// ============================================================
// Request validation
// ============================================================

#[tokio::test]
async fn test_blank_staff_fields_are_rejected_before_the_gate() {
    let (state, app) = setup().await;
    let tenant = seed_tenant(&state, Some("plan_free"), SubscriptionStatus::Active).await;

    let response = app
        .oneshot(post_json(
            "/api/staff",
            &tenant,
            json!({ "email": "  ", "name": "X" }),
        ))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_negative_order_total_is_rejected() {
    let (state, app) = setup().await;
    let tenant = seed_tenant(&state, Some("plan_pro"), SubscriptionStatus::Active).await;

    let response = app
        .oneshot(post_json(
            "/api/orders",
            &tenant,
            json!({ "total_cents": -1 }),
        ))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ============================================================
// CORS configuration
// ============================================================

#[tokio::test]
async fn test_configured_cors_origins_form_an_allow_list() {
    let db = DuckDbBackend::open_in_memory().expect("in-memory DuckDB");
    let mut config = test_config();
    config.cors_origins = vec!["https://admin.acme.example".to_string()];
    let state = Arc::new(AppState::new(db, config));
    let app = build_app(state);

    let allowed = Request::builder()
        .method("GET")
        .uri("/health")
        .header("origin", "https://admin.acme.example")
        .body(Body::empty())
        .expect("build request");
    let response = app.clone().oneshot(allowed).await.expect("request");
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("https://admin.acme.example")
    );

    let denied = Request::builder()
        .method("GET")
        .uri("/health")
        .header("origin", "https://evil.example")
        .body(Body::empty())
        .expect("build request");
    let response = app.oneshot(denied).await.expect("request");
    assert!(response.headers().get("access-control-allow-origin").is_none());
}

// ============================================================
// Provisioning
// ============================================================

#[tokio::test]
async fn test_provisioning_rejects_unknown_plan() {
    let (_state, app) = setup().await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/tenants")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"plan_id":"plan_nope"}"#))
        .expect("build request");

    let response = app.oneshot(request).await.expect("request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_provisioned_tenant_is_admitted() {
    let (_state, app) = setup().await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/tenants")
        .header("content-type", "application/json")
        .body(Body::from(
            r#"{"id":"ten_acme","plan_id":"plan_free","subscription_status":"active"}"#,
        ))
        .expect("build request");
    let response = app.clone().oneshot(request).await.expect("request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(post_staff("ten_acme", "first@example.com"))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::CREATED);
}
