//! Integration tests for artifact creation, fetch, flagging, and removal.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete_auth, get_auth, post_auth, post_json_auth, seed_user, token_for};
use serde_json::json;
use sqlx::PgPool;

fn create_body(lat: f64, lng: f64) -> serde_json::Value {
    json!({
        "kind": "chat",
        "content": "anyone around the fountain?",
        "latitude": lat,
        "longitude": lng,
    })
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn create_artifact_returns_201_with_preview(pool: PgPool) {
    let user = seed_user(&pool, "poster", "user").await;
    let token = token_for(user, "user");
    let app = common::build_test_app(pool);

    let response =
        post_json_auth(app, "/api/v1/artifacts", &token, create_body(40.7128, -74.0060)).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    let data = &json["data"];
    assert_eq!(data["kind"], "chat");
    assert_eq!(data["owner_id"], user);
    assert_eq!(data["moderation_status"], "clean");
    assert!(data["expires_at"].is_string());
    // Owners see their exact coordinates, not the fuzzed ones.
    assert_eq!(data["latitude"].as_f64().unwrap(), 40.7128);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn create_rejects_invalid_coordinates(pool: PgPool) {
    let user = seed_user(&pool, "poster", "user").await;
    let token = token_for(user, "user");
    let app = common::build_test_app(pool);

    let response =
        post_json_auth(app, "/api/v1/artifacts", &token, create_body(91.0, 0.0)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn create_rejects_contact_information(pool: PgPool) {
    let user = seed_user(&pool, "poster", "user").await;
    let token = token_for(user, "user");
    let app = common::build_test_app(pool);

    let body = json!({
        "kind": "board_post",
        "content": "text me at 555-123-4567",
        "latitude": 40.7128,
        "longitude": -74.0060,
    });
    let response = post_json_auth(app, "/api/v1/artifacts", &token, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn create_rejects_unknown_kind(pool: PgPool) {
    let user = seed_user(&pool, "poster", "user").await;
    let token = token_for(user, "user");
    let app = common::build_test_app(pool);

    let body = json!({
        "kind": "token_drop",
        "content": "free tokens",
        "latitude": 40.7128,
        "longitude": -74.0060,
    });
    let response = post_json_auth(app, "/api/v1/artifacts", &token, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn daily_cap_is_enforced_per_kind(pool: PgPool) {
    let user = seed_user(&pool, "poster", "user").await;
    let token = token_for(user, "user");
    let app = common::build_test_app(pool);

    // board_post cap is 10 per UTC day.
    for _ in 0..10 {
        let body = json!({
            "kind": "board_post",
            "content": "selling nothing, just vibes",
            "latitude": 40.7128,
            "longitude": -74.0060,
        });
        let response = post_json_auth(app.clone(), "/api/v1/artifacts", &token, body).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let body = json!({
        "kind": "board_post",
        "content": "one more",
        "latitude": 40.7128,
        "longitude": -74.0060,
    });
    let response = post_json_auth(app, "/api/v1/artifacts", &token, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("cap"));
}

// ---------------------------------------------------------------------------
// Fetch and coordinate fuzzing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn strangers_see_fuzzed_coordinates(pool: PgPool) {
    let owner = seed_user(&pool, "owner", "user").await;
    let stranger = seed_user(&pool, "stranger", "user").await;
    let owner_token = token_for(owner, "user");
    let stranger_token = token_for(stranger, "user");
    let app = common::build_test_app(pool);

    let created = post_json_auth(
        app.clone(),
        "/api/v1/artifacts",
        &owner_token,
        create_body(40.7128, -74.0060),
    )
    .await;
    let id = body_json(created).await["data"]["id"].as_i64().unwrap();

    let response =
        get_auth(app, &format!("/api/v1/artifacts/{id}"), &stranger_token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let lat = json["data"]["latitude"].as_f64().unwrap();
    // Jittered, but within the fuzz envelope (~75m per axis ≈ 0.0007 deg).
    assert_ne!(lat, 40.7128);
    assert!((lat - 40.7128).abs() < 0.002);
}

// ---------------------------------------------------------------------------
// Flagging
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn owner_cannot_flag_own_artifact(pool: PgPool) {
    let owner = seed_user(&pool, "owner", "user").await;
    let token = token_for(owner, "user");
    let app = common::build_test_app(pool);

    let created =
        post_json_auth(app.clone(), "/api/v1/artifacts", &token, create_body(40.7, -74.0)).await;
    let id = body_json(created).await["data"]["id"].as_i64().unwrap();

    let response = post_auth(app, &format!("/api/v1/artifacts/{id}/flag"), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn three_flags_escalate_to_flagged_and_hide_from_strangers(pool: PgPool) {
    let owner = seed_user(&pool, "owner", "user").await;
    let owner_token = token_for(owner, "user");
    let app = common::build_test_app(pool.clone());

    let created = post_json_auth(
        app.clone(),
        "/api/v1/artifacts",
        &owner_token,
        create_body(40.7, -74.0),
    )
    .await;
    let id = body_json(created).await["data"]["id"].as_i64().unwrap();

    for i in 0..3 {
        let reporter = seed_user(&pool, &format!("reporter-{i}"), "user").await;
        let token = token_for(reporter, "user");
        let response =
            post_auth(app.clone(), &format!("/api/v1/artifacts/{id}/flag"), &token).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    // Owner still sees it, now flagged.
    let response =
        get_auth(app.clone(), &format!("/api/v1/artifacts/{id}"), &owner_token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["moderation_status"], "flagged");

    // Strangers get a 404; flagged content's existence is not disclosed.
    let stranger = seed_user(&pool, "stranger", "user").await;
    let stranger_token = token_for(stranger, "user");
    let response = get_auth(app, &format!("/api/v1/artifacts/{id}"), &stranger_token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Removal
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn owner_delete_tombstones_artifact(pool: PgPool) {
    let owner = seed_user(&pool, "owner", "user").await;
    let token = token_for(owner, "user");
    let app = common::build_test_app(pool);

    let created =
        post_json_auth(app.clone(), "/api/v1/artifacts", &token, create_body(40.7, -74.0)).await;
    let id = body_json(created).await["data"]["id"].as_i64().unwrap();

    let response = delete_auth(app.clone(), &format!("/api/v1/artifacts/{id}"), &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Removed artifacts are visible to no one, including the owner.
    let response = get_auth(app, &format!("/api/v1/artifacts/{id}"), &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn non_owner_cannot_delete(pool: PgPool) {
    let owner = seed_user(&pool, "owner", "user").await;
    let stranger = seed_user(&pool, "stranger", "user").await;
    let owner_token = token_for(owner, "user");
    let stranger_token = token_for(stranger, "user");
    let app = common::build_test_app(pool);

    let created = post_json_auth(
        app.clone(),
        "/api/v1/artifacts",
        &owner_token,
        create_body(40.7, -74.0),
    )
    .await;
    let id = body_json(created).await["data"]["id"].as_i64().unwrap();

    let response = delete_auth(app, &format!("/api/v1/artifacts/{id}"), &stranger_token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
