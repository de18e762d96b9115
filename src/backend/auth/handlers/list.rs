//! User listing handler

use axum::{extract::State, response::Json};

use crate::backend::auth::handlers::types::UserSummary;
use crate::backend::error::BackendResult;
use crate::backend::server::state::AppState;

/// GET /users, newest first
pub async fn list_users(State(state): State<AppState>) -> BackendResult<Json<Vec<UserSummary>>> {
    let users = state.store.list_users().await?;
    tracing::debug!("Listing {} users", users.len());
    Ok(Json(users.into_iter().map(UserSummary::from).collect()))
}
