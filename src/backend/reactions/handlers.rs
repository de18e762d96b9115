//! `/reactions` handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::backend::error::{BackendError, BackendResult};
use crate::backend::extract::{parse_id, present, ApiJson, ApiQuery};
use crate::backend::posts::handlers::ActorQuery;
use crate::backend::reactions::engine::{self, ReactOutcome, ReactionSummary};
use crate::backend::server::state::AppState;
use crate::shared::ReactionType;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionRequest {
    pub post_id: Option<String>,
    pub user_id: Option<String>,
    pub reaction_type: Option<String>,
}

/// Validated request fields, ids still raw so the demo identity passes
struct ReactionInput {
    post_id: String,
    user_id: String,
    reaction_type: ReactionType,
}

impl ReactionRequest {
    fn validate(self) -> BackendResult<ReactionInput> {
        match (
            present(self.post_id),
            present(self.user_id),
            present(self.reaction_type),
        ) {
            (Some(post_id), Some(user_id), Some(reaction_type)) => Ok(ReactionInput {
                post_id,
                user_id,
                reaction_type: reaction_type.parse::<ReactionType>()?,
            }),
            _ => {
                tracing::warn!("Reaction request missing required fields");
                Err(BackendError::validation(
                    "postId_userId_reactionType_required",
                ))
            }
        }
    }
}

/// Reaction as returned to clients
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionReply {
    pub id: Uuid,
    pub post_id: String,
    pub user_id: String,
    pub reaction_type: ReactionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_type: Option<ReactionType>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_demo: bool,
}

impl ReactionReply {
    fn from_outcome(outcome: &ReactOutcome) -> Self {
        let reaction = outcome.reaction();
        let previous_type = match outcome {
            ReactOutcome::Switched { previous, .. } => Some(*previous),
            _ => None,
        };
        Self {
            id: reaction.id,
            post_id: reaction.post_id.to_string(),
            user_id: reaction.user_id.to_string(),
            reaction_type: reaction.reaction_type,
            previous_type,
            created_at: reaction.created_at,
            updated_at: reaction.updated_at,
            is_demo: false,
        }
    }

    fn demo(input: &ReactionInput, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            post_id: input.post_id.clone(),
            user_id: input.user_id.clone(),
            reaction_type: input.reaction_type,
            previous_type: None,
            created_at: now,
            updated_at: now,
            is_demo: true,
        }
    }
}

/// POST /reactions
///
/// 201 for a first reaction, 200 when unchanged or switched.
pub async fn add_reaction(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ReactionRequest>,
) -> BackendResult<(StatusCode, Json<ReactionReply>)> {
    let input = request.validate()?;
    let now = Utc::now();

    if state.is_demo_user(&input.user_id) {
        tracing::debug!("Demo reaction on post {} not persisted", input.post_id);
        return Ok((StatusCode::CREATED, Json(ReactionReply::demo(&input, now))));
    }

    let post_id = parse_id(&input.post_id, "post_id")?;
    let user_id = parse_id(&input.user_id, "user_id")?;

    let outcome = engine::react(
        state.store.as_ref(),
        post_id,
        user_id,
        input.reaction_type,
        now,
    )
    .await?;

    let status = if outcome.is_created() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(ReactionReply::from_outcome(&outcome))))
}

/// DELETE /reactions
pub async fn remove_reaction(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ReactionRequest>,
) -> BackendResult<Json<Value>> {
    let input = request.validate()?;

    if state.is_demo_user(&input.user_id) {
        tracing::debug!("Demo unreact on post {} not persisted", input.post_id);
        return Ok(Json(json!({
            "message": "reaction_removed",
            "reactionType": input.reaction_type,
            "isDemo": true,
        })));
    }

    let post_id = parse_id(&input.post_id, "post_id")?;
    let user_id = parse_id(&input.user_id, "user_id")?;

    let removed = engine::unreact(state.store.as_ref(), post_id, user_id, input.reaction_type).await?;
    Ok(Json(json!({
        "message": "reaction_removed",
        "reactionType": removed.reaction_type,
    })))
}

/// GET /reactions/{postId}
///
/// A demo or malformed `userId` simply yields no `userReaction`.
pub async fn list_reactions(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    ApiQuery(query): ApiQuery<ActorQuery>,
) -> BackendResult<Json<ReactionSummary>> {
    let post_id = parse_id(&post_id, "post_id")?;
    let user_id = present(query.user_id).and_then(|raw| Uuid::parse_str(&raw).ok());

    let summary = engine::get_reactions(state.store.as_ref(), post_id, user_id).await?;
    tracing::debug!(
        "Post {} has {} reactions",
        post_id,
        summary.total_reactions
    );
    Ok(Json(summary))
}
