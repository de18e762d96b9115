//! `/posts` handlers

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::backend::error::{BackendError, BackendResult};
use crate::backend::extract::{acting_user, body_user, parse_id, present, ApiJson, ApiQuery};
use crate::backend::posts::service::{self, NewPost, PostView};
use crate::backend::server::state::AppState;
use crate::backend::store::PostQuery;
use crate::shared::{Post, PostDuration};

/// Largest page a client may ask for
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author_id: Option<String>,
    pub room_id: Option<String>,
    pub category: Option<String>,
    pub duration: Option<String>,
    pub is_voice_note: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPostsQuery {
    pub room_id: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorQuery {
    pub user_id: Option<String>,
}

/// POST /posts
pub async fn create_post(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreatePostRequest>,
) -> BackendResult<(StatusCode, Json<Post>)> {
    let (title, content, author_id, room_id) = match (
        present(request.title),
        present(request.content),
        present(request.author_id),
        present(request.room_id),
    ) {
        (Some(title), Some(content), Some(author_id), Some(room_id)) => {
            (title, content, author_id, room_id)
        }
        _ => {
            tracing::warn!("Post rejected: missing required fields");
            return Err(BackendError::validation(
                "title_content_authorId_roomId_required",
            ));
        }
    };

    let duration = match present(request.duration) {
        Some(raw) => Some(raw.parse::<PostDuration>()?),
        None => None,
    };

    let new_post = NewPost {
        title,
        content,
        author_id: parse_id(&author_id, "author_id")?,
        room_id: parse_id(&room_id, "room_id")?,
        category: present(request.category),
        duration,
        is_voice_note: request.is_voice_note.unwrap_or(false),
    };

    let post = service::create(state.store.as_ref(), &state.policy, new_post, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// GET /posts
pub async fn list_posts(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListPostsQuery>,
) -> BackendResult<Json<Vec<PostView>>> {
    let room_id = match present(query.room_id) {
        Some(raw) => Some(parse_id(&raw, "room_id")?),
        None => None,
    };
    let query = PostQuery {
        room_id,
        limit: query.limit.unwrap_or(20).clamp(0, MAX_PAGE_SIZE),
        offset: query.offset.unwrap_or(0).max(0),
    };
    tracing::debug!("Listing posts: {:?}", query);

    let posts = service::list(state.store.as_ref(), query, Utc::now()).await?;
    Ok(Json(posts))
}

/// DELETE /posts/{id}
///
/// The acting user comes from the body, the query, the `x-user-id`
/// header or a bearer token, in that order.
pub async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiQuery(query): ApiQuery<ActorQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> BackendResult<Json<Value>> {
    let actor = acting_user(body_user(&body), query.user_id, &headers, &state.config.jwt_secret)
        .ok_or_else(|| {
            tracing::warn!("Delete of post {} rejected: no acting user", id);
            BackendError::validation("user_id_required")
        })?;
    let post_id = parse_id(&id, "post_id")?;

    service::delete(state.store.as_ref(), post_id, &actor).await?;
    Ok(Json(json!({ "success": true })))
}
