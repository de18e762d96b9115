//! Anonymous identity handler
//!
//! POST /users/anonymous hands out a fresh alias and anonymous id. Nothing
//! is stored, so every call is a new identity.

use axum::{http::StatusCode, response::Json};

use crate::backend::auth::handlers::types::AnonymousResponse;
use crate::backend::auth::identity::Identity;

pub async fn create_anonymous() -> (StatusCode, Json<AnonymousResponse>) {
    let identity = Identity::generate();
    tracing::debug!("Issued anonymous identity {}", identity.anonymous_id);
    (
        StatusCode::CREATED,
        Json(AnonymousResponse {
            id: None,
            name: "Anonymous".to_string(),
            alias: identity.alias,
            anonymous_id: identity.anonymous_id,
        }),
    )
}
