//! Common test utilities and helpers
//!
//! Every test server runs over a fresh `MemoryStore` with no background
//! sweep, so tests drive expiration explicitly.

#![allow(dead_code)]

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use tearoom::backend::server::{build_app, AppConfig, AppState};
use tearoom::backend::store::{MemoryStore, PostStore};
use tearoom::shared::{Post, PostDuration};

pub struct TestApp {
    pub server: TestServer,
    pub store: Arc<MemoryStore>,
    pub state: AppState,
}

pub fn test_config() -> AppConfig {
    AppConfig {
        bcrypt_cost: 4,
        seed_catalog: false,
        jwt_secret: "integration-test-secret".to_string(),
        ..AppConfig::default()
    }
}

pub fn spawn_app() -> TestApp {
    spawn_app_with(test_config())
}

pub fn spawn_app_with(config: AppConfig) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let (router, state) = build_app(store.clone(), config);
    let server = TestServer::new(router).expect("Failed to start test server");
    TestApp {
        server,
        store,
        state,
    }
}

pub fn user_header(user_id: &str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("x-user-id"),
        HeaderValue::from_str(user_id).expect("valid header value"),
    )
}

impl TestApp {
    /// Sign up a user and return the response body
    pub async fn signup(&self, name: &str) -> Value {
        let email = format!("{}_{}@example.com", name.to_lowercase(), Uuid::new_v4().simple());
        let response = self
            .server
            .post("/users")
            .json(&json!({ "name": name, "email": email, "password": "hunter22" }))
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
        response.json::<Value>()
    }

    pub async fn signup_id(&self, name: &str) -> String {
        id_of(&self.signup(name).await)
    }

    pub async fn create_room(&self, name: &str) -> String {
        let response = self
            .server
            .post("/rooms")
            .json(&json!({ "name": name, "description": format!("{} talk", name) }))
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
        id_of(&response.json::<Value>())
    }

    pub async fn create_post(&self, author_id: &str, room_id: &str, title: &str) -> Value {
        let response = self
            .server
            .post("/posts")
            .json(&json!({
                "title": title,
                "content": format!("{} content", title),
                "authorId": author_id,
                "roomId": room_id,
                "duration": "24h",
            }))
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
        response.json::<Value>()
    }

    pub async fn create_post_id(&self, author_id: &str, room_id: &str, title: &str) -> String {
        id_of(&self.create_post(author_id, room_id, title).await)
    }

    /// Store a post directly, bypassing the lifetime policy
    pub async fn insert_post_expiring(
        &self,
        author_id: &str,
        room_id: &str,
        created_at: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Post {
        let post = Post {
            id: Uuid::new_v4(),
            title: "stored".into(),
            content: "stored content".into(),
            author_id: parse(author_id),
            room_id: parse(room_id),
            category: "General".into(),
            duration: PostDuration::Day,
            is_voice_note: false,
            expires_at,
            is_expired: false,
            created_at,
        };
        self.store.insert_post(&post).await.expect("insert post");
        post
    }

    pub async fn insert_expired_post(&self, author_id: &str, room_id: &str) -> Post {
        let created = Utc::now() - Duration::hours(25);
        self.insert_post_expiring(author_id, room_id, created, Some(created + Duration::hours(24)))
            .await
    }
}

pub fn id_of(body: &Value) -> String {
    body["id"]
        .as_str()
        .expect("response carries an id")
        .to_string()
}

pub fn parse(id: &str) -> Uuid {
    Uuid::parse_str(id).expect("valid uuid")
}
