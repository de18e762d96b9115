//! Liveness and diagnostics endpoints

use axum::{extract::State, http::StatusCode, response::Json};
use chrono::Utc;
use serde_json::{json, Value};

use crate::backend::middleware::{SessionStats, SessionTracker};
use crate::backend::server::state::AppState;

/// GET /health
///
/// 200 while the store answers, 503 otherwise. The body always carries
/// `status: "ok"` because the process itself is up.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let (status, db) = match state.store.ping().await {
        Ok(()) => (StatusCode::OK, "connected"),
        Err(e) => {
            tracing::warn!("Health check: store unreachable: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "disconnected")
        }
    };
    (
        status,
        Json(json!({
            "status": "ok",
            "db": db,
            "store": state.store.backend_name(),
        })),
    )
}

/// GET /debug/sessions
pub async fn session_stats(State(sessions): State<SessionTracker>) -> Json<SessionStats> {
    let stats = sessions.stats(Utc::now());
    tracing::debug!(
        "Session stats: {} sessions, {} active, {} actions",
        stats.total_sessions,
        stats.active_sessions,
        stats.total_actions
    );
    Json(stats)
}
