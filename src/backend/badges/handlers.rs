//! `/badges` and `/users/{id}/stats` handlers

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    response::Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::backend::badges::evaluator::{self, UserStats};
use crate::backend::error::BackendResult;
use crate::backend::extract::parse_id;
use crate::backend::server::state::AppState;
use crate::shared::{BadgeRequirements, Rarity};

/// A catalog badge from one user's point of view
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeStatus {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub rarity: Rarity,
    pub earned: bool,
    pub earned_at: Option<DateTime<Utc>>,
    /// Satisfied but not yet earned
    pub meets_requirements: bool,
    pub requirements: BadgeRequirements,
}

/// GET /badges/{userId}
pub async fn list_badges(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> BackendResult<Json<Vec<BadgeStatus>>> {
    let user_id = parse_id(&user_id, "user_id")?;
    let store = state.store.as_ref();

    let stats = evaluator::compute_user_stats(store, user_id, Utc::now()).await?;
    let earned: HashMap<Uuid, DateTime<Utc>> = store
        .list_user_badges(user_id)
        .await?
        .into_iter()
        .map(|ub| (ub.badge_id, ub.earned_at))
        .collect();

    let statuses = store
        .list_active_badges()
        .await?
        .into_iter()
        .map(|badge| {
            let earned_at = earned.get(&badge.id).copied();
            let meets = evaluator::meets_requirements(&badge, &stats);
            BadgeStatus {
                id: badge.id,
                name: badge.name,
                description: badge.description,
                icon: badge.icon,
                rarity: badge.rarity,
                earned: earned_at.is_some(),
                earned_at,
                meets_requirements: meets && earned_at.is_none(),
                requirements: badge.requirements,
            }
        })
        .collect::<Vec<_>>();

    tracing::debug!("{} badges listed for {}", statuses.len(), user_id);
    Ok(Json(statuses))
}

/// POST /badges/{userId}/check
pub async fn check_badges(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> BackendResult<Json<Value>> {
    let user_id = parse_id(&user_id, "user_id")?;
    let awarded = evaluator::check_and_award(state.store.as_ref(), user_id, Utc::now()).await?;
    tracing::info!("{} new badges for {}", awarded.len(), user_id);
    Ok(Json(json!({
        "totalNew": awarded.len(),
        "newBadges": awarded,
    })))
}

/// GET /users/{id}/stats
pub async fn user_stats(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> BackendResult<Json<UserStats>> {
    let user_id = parse_id(&user_id, "user_id")?;
    let stats = evaluator::compute_user_stats(state.store.as_ref(), user_id, Utc::now()).await?;
    Ok(Json(stats))
}
