//! Shared integration-test harness.
//!
//! Mirrors the production router construction so tests exercise the same
//! middleware stack (CORS, request ID, timeout, tracing, panic recovery).

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use pulse_api::auth::jwt::{generate_access_token, JwtConfig};
use pulse_api::config::ServerConfig;
use pulse_api::geoip::NoopGeolocator;
use pulse_api::router::build_app_router;
use pulse_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
///
/// IP geolocation is disabled so no test ever touches the network.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        sweep_interval_secs: 60,
        tombstone_grace_days: 30,
        ipgeo_base_url: String::new(),
        ipgeo_timeout_secs: 2,
        candidate_freshness_hours: 24,
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        geolocator: Arc::new(NoopGeolocator),
    };
    build_app_router(state, &config)
}

/// Mint a bearer token for the given user id and role.
pub fn token_for(user_id: i64, role: &str) -> String {
    generate_access_token(user_id, role, &test_config().jwt)
        .expect("test token must generate")
}

/// Insert a user row and return its id.
pub async fn seed_user(pool: &PgPool, display_name: &str, role: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO users (display_name, role) VALUES ($1, $2) RETURNING id",
    )
    .bind(display_name)
    .bind(role)
    .fetch_one(pool)
    .await
    .expect("user must insert")
}

/// Unauthenticated GET.
pub async fn get(app: Router, path: &str) -> Response<Body> {
    let request = Request::builder().uri(path).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

/// Authenticated GET.
pub async fn get_auth(app: Router, path: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(path)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Authenticated POST with a JSON body.
pub async fn post_json_auth(
    app: Router,
    path: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Authenticated POST without a body.
pub async fn post_auth(app: Router, path: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Authenticated DELETE.
pub async fn delete_auth(app: Router, path: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method("DELETE")
        .uri(path)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("response body must be JSON")
}
