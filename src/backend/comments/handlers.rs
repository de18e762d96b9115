//! `/comments` handlers

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::backend::comments::thread::{self, CommentView};
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::extract::{acting_user, body_user, parse_id, present, ApiJson, ApiQuery};
use crate::backend::posts::handlers::ActorQuery;
use crate::backend::posts::service::is_author;
use crate::backend::server::state::AppState;
use crate::backend::store::{constraints, Store};
use crate::backend::views::AuthorView;
use crate::shared::Comment;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub post_id: Option<String>,
    pub author_id: Option<String>,
    pub content: Option<String>,
    pub parent_comment_id: Option<String>,
}

async fn require_live_post(store: &dyn Store, post_id: Uuid) -> BackendResult<()> {
    match store.find_post(post_id).await? {
        Some(post) if post.is_live(Utc::now()) => Ok(()),
        _ => Err(BackendError::not_found("post_not_found")),
    }
}

/// GET /comments/{postId}
pub async fn list_comments(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> BackendResult<Json<Vec<CommentView>>> {
    let post_id = parse_id(&post_id, "post_id")?;
    require_live_post(state.store.as_ref(), post_id).await?;

    let thread = thread::build_thread(state.store.as_ref(), post_id).await?;
    tracing::debug!("Post {} has {} top-level comments", post_id, thread.len());
    Ok(Json(thread))
}

/// POST /comments
pub async fn create_comment(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateCommentRequest>,
) -> BackendResult<(StatusCode, Json<CommentView>)> {
    let (post_id, author_id, content) = match (
        present(request.post_id),
        present(request.author_id),
        present(request.content),
    ) {
        (Some(post_id), Some(author_id), Some(content)) => (post_id, author_id, content),
        _ => {
            tracing::warn!("Comment rejected: missing required fields");
            return Err(BackendError::validation(
                "postId_authorId_and_content_required",
            ));
        }
    };
    let post_id = parse_id(&post_id, "post_id")?;
    let author_id = parse_id(&author_id, "author_id")?;
    let parent_id = match present(request.parent_comment_id) {
        Some(raw) => Some(parse_id(&raw, "parent_comment_id")?),
        None => None,
    };

    let store = state.store.as_ref();
    require_live_post(store, post_id).await?;
    let author = store
        .find_user(author_id)
        .await?
        .ok_or_else(|| BackendError::not_found("user_not_found"))?;

    if let Some(parent_id) = parent_id {
        let parent = store
            .find_comment(parent_id)
            .await?
            .filter(|c| !c.is_deleted)
            .ok_or_else(|| BackendError::not_found("parent_comment_not_found"))?;
        if parent.post_id != post_id {
            return Err(BackendError::validation("parent_post_mismatch"));
        }
        if parent.is_reply() {
            return Err(BackendError::validation("nested_reply_not_supported"));
        }
    }

    let comment = Comment::new(post_id, author_id, parent_id, content, Utc::now());
    match store.insert_comment(&comment).await {
        Ok(()) => {}
        Err(e) if e.violates(constraints::COMMENT_POST) => {
            tracing::warn!("Comment rejected: post {} removed while commenting", post_id);
            return Err(BackendError::not_found("post_not_found"));
        }
        Err(e) => return Err(e.into()),
    }
    tracing::info!("Comment {} added to post {} by {}", comment.id, post_id, author_id);

    let view = CommentView::new(comment, Some(AuthorView::from(&author)));
    Ok((StatusCode::CREATED, Json(view)))
}

/// DELETE /comments/{commentId}
pub async fn delete_comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiQuery(query): ApiQuery<ActorQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> BackendResult<Json<Value>> {
    let actor = acting_user(body_user(&body), query.user_id, &headers, &state.config.jwt_secret)
        .ok_or_else(|| BackendError::validation("user_id_required"))?;
    let comment_id = parse_id(&id, "comment_id")?;

    let comment = state
        .store
        .find_comment(comment_id)
        .await?
        .filter(|c| !c.is_deleted)
        .ok_or_else(|| BackendError::not_found("comment_not_found"))?;

    if !is_author(comment.author_id, &actor) {
        tracing::warn!("User {} may not delete comment {}", actor, comment_id);
        return Err(BackendError::forbidden("not_authorized"));
    }

    if !state.store.soft_delete_comment(comment_id).await? {
        return Err(BackendError::not_found("comment_not_found"));
    }
    tracing::info!("Comment {} deleted by {}", comment_id, actor);
    Ok(Json(json!({ "message": "comment_deleted" })))
}
