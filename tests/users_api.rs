//! User endpoint integration tests

mod common;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use common::spawn_app;

#[tokio::test]
async fn test_signup_returns_identity_and_token() {
    let app = spawn_app();
    let response = app
        .server
        .post("/users")
        .json(&json!({ "name": "Ada", "email": "  Ada@Example.com ", "password": "hunter22" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["email"], "ada@example.com");
    assert!(body["alias"].as_str().is_some_and(|a| !a.is_empty()));
    assert!(body["anonymousId"].as_str().is_some_and(|a| a.starts_with("anon_")));
    assert!(body["token"].as_str().is_some());
    assert!(body.get("password").is_none());
    assert!(body.get("passwordHash").is_none());
}

#[tokio::test]
async fn test_signup_duplicate_email() {
    let app = spawn_app();
    let payload = json!({ "name": "Ada", "email": "ada@example.com", "password": "hunter22" });
    app.server.post("/users").json(&payload).await;

    let response = app.server.post("/users").json(&payload).await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["error"], "email_already_exists");
}

#[tokio::test]
async fn test_signup_validation() {
    let app = spawn_app();

    let missing = app
        .server
        .post("/users")
        .json(&json!({ "name": "Ada", "email": "ada@example.com" }))
        .await;
    assert_eq!(missing.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(missing.json::<Value>()["error"], "name_email_and_password_required");

    let bad_email = app
        .server
        .post("/users")
        .json(&json!({ "name": "Ada", "email": "not-an-email", "password": "x" }))
        .await;
    assert_eq!(bad_email.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(bad_email.json::<Value>()["error"], "invalid_email");
}

#[tokio::test]
async fn test_malformed_json_body() {
    let app = spawn_app();
    let response = app
        .server
        .post("/users")
        .add_header(
            HeaderName::from_static("content-type"),
            HeaderValue::from_static("application/json"),
        )
        .bytes("{not json".into())
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "invalid_body");
}

#[tokio::test]
async fn test_login_flow() {
    let app = spawn_app();
    let signup: Value = app
        .server
        .post("/users")
        .json(&json!({ "name": "Bo", "email": "bo@example.com", "password": "s3cret!" }))
        .await
        .json();

    let ok = app
        .server
        .post("/users/login")
        .json(&json!({ "email": "BO@example.com", "password": "s3cret!" }))
        .await;
    assert_eq!(ok.status_code(), StatusCode::OK);
    let body: Value = ok.json();
    assert_eq!(body["id"], signup["id"]);
    assert_eq!(body["alias"], signup["alias"]);
    assert_eq!(body["anonymousId"], signup["anonymousId"]);
    assert_eq!(body["totalPosts"], 0);
    assert!(body["token"].as_str().is_some());

    let wrong = app
        .server
        .post("/users/login")
        .json(&json!({ "email": "bo@example.com", "password": "nope" }))
        .await;
    assert_eq!(wrong.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.json::<Value>()["error"], "invalid_credentials");

    let unknown = app
        .server
        .post("/users/login")
        .json(&json!({ "email": "ghost@example.com", "password": "nope" }))
        .await;
    assert_eq!(unknown.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.json::<Value>()["error"], "invalid_credentials");

    let missing = app
        .server
        .post("/users/login")
        .json(&json!({ "email": "bo@example.com" }))
        .await;
    assert_eq!(missing.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(missing.json::<Value>()["error"], "email_and_password_required");
}

#[tokio::test]
async fn test_anonymous_identity_is_not_stored() {
    let app = spawn_app();
    let first: Value = app.server.post("/users/anonymous").await.json();
    let second = app.server.post("/users/anonymous").await;
    assert_eq!(second.status_code(), StatusCode::CREATED);
    let second: Value = second.json();

    assert!(first["id"].is_null());
    assert!(first["alias"].as_str().is_some());
    assert_ne!(first["anonymousId"], second["anonymousId"]);

    let users: Value = app.server.get("/users").await.json();
    assert_eq!(users.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn test_routes_mounted_under_api_prefix() {
    let app = spawn_app();
    app.signup("Cy").await;

    let root: Value = app.server.get("/users").await.json();
    let api = app.server.get("/api/users").await;
    assert_eq!(api.status_code(), StatusCode::OK);
    assert_eq!(api.json::<Value>(), root);
    assert_eq!(root[0]["name"], "Cy");
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let app = spawn_app();
    let response = app.server.get("/nowhere").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["error"], "route_not_found");
}

#[tokio::test]
async fn test_health_and_session_diagnostics() {
    let app = spawn_app();
    let health = app.server.get("/health").await;
    assert_eq!(health.status_code(), StatusCode::OK);
    let body: Value = health.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["db"], "connected");
    assert_eq!(body["store"], "memory");

    app.server.get("/api/health").await;
    let stats: Value = app.server.get("/debug/sessions").await.json();
    assert_eq!(stats["totalSessions"], 1);
    assert_eq!(stats["totalActions"], 3);
}
