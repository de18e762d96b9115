/**
 * Post Operations
 *
 * # Create
 *
 * 1. The author and room must exist
 * 2. The expiration policy fixes the effective duration and expiry
 * 3. The post is inserted
 * 4. Room (`recent_post_count`, `last_activity`) and author
 *    (`total_posts`, `last_active_at`) are updated independently; a
 *    failure of either is logged and the create still succeeds
 *
 * # Delete
 *
 * Only the author may delete. The cascade removes reactions and comments
 * before the post; a cascade failure is returned to the caller because it
 * would otherwise leave orphans behind a success response.
 *
 * # List
 *
 * Live posts only, newest first, each with author and room display fields.
 */

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::backend::error::{BackendError, BackendResult};
use crate::backend::expiration::{remove_post, CascadeSummary, ExpirationPolicy};
use crate::backend::store::{PostQuery, Store, UserCounterDelta};
use crate::backend::views::{AuthorView, ProfileCache, RoomView};
use crate::shared::models::post::DEFAULT_CATEGORY;
use crate::shared::{Post, PostDuration};

/// Validated input for a new post
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
    pub room_id: Uuid,
    pub category: Option<String>,
    pub duration: Option<PostDuration>,
    pub is_voice_note: bool,
}

/// A post as shown in listings
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
    pub author: Option<AuthorView>,
    pub room_id: Uuid,
    pub room: Option<RoomView>,
    pub category: String,
    pub duration: PostDuration,
    pub is_voice_note: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl PostView {
    pub fn new(post: Post, author: Option<AuthorView>, room: Option<RoomView>) -> Self {
        Self {
            id: post.id,
            title: post.title,
            content: post.content,
            author_id: post.author_id,
            author,
            room_id: post.room_id,
            room,
            category: post.category,
            duration: post.duration,
            is_voice_note: post.is_voice_note,
            expires_at: post.expires_at,
            created_at: post.created_at,
        }
    }
}

pub async fn create(
    store: &dyn Store,
    policy: &ExpirationPolicy,
    new_post: NewPost,
    now: DateTime<Utc>,
) -> BackendResult<Post> {
    if store.find_user(new_post.author_id).await?.is_none() {
        tracing::warn!("Post rejected: author {} not found", new_post.author_id);
        return Err(BackendError::not_found("user_not_found"));
    }
    if store.find_room(new_post.room_id).await?.is_none() {
        tracing::warn!("Post rejected: room {} not found", new_post.room_id);
        return Err(BackendError::not_found("room_not_found"));
    }

    let (duration, expires_at) = policy.assign(new_post.duration, now);
    if let Some(requested) = new_post.duration {
        if requested != duration {
            tracing::debug!(
                "Requested duration {} clamped to {}",
                requested.as_str(),
                duration.as_str()
            );
        }
    }

    let post = Post {
        id: Uuid::new_v4(),
        title: new_post.title,
        content: new_post.content,
        author_id: new_post.author_id,
        room_id: new_post.room_id,
        category: new_post
            .category
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        duration,
        is_voice_note: new_post.is_voice_note,
        expires_at,
        is_expired: false,
        created_at: now,
    };

    store.insert_post(&post).await?;

    if let Err(e) = store.adjust_room_posts(post.room_id, 1, Some(now)).await {
        tracing::warn!("Failed to update room {} after post {}: {}", post.room_id, post.id, e);
    }
    if let Err(e) = store
        .adjust_user_counters(post.author_id, UserCounterDelta::posts(1).touched(now))
        .await
    {
        tracing::warn!("Failed to update user {} after post {}: {}", post.author_id, post.id, e);
    }

    tracing::info!("Post created successfully: {}", post.id);
    Ok(post)
}

/// Whether `actor` names the same identity as `author_id`
pub fn is_author(author_id: Uuid, actor: &str) -> bool {
    Uuid::parse_str(actor.trim()).map_or(false, |id| id == author_id)
}

pub async fn delete(store: &dyn Store, post_id: Uuid, actor: &str) -> BackendResult<CascadeSummary> {
    let post = store
        .find_post(post_id)
        .await?
        .ok_or_else(|| BackendError::not_found("post_not_found"))?;

    if !is_author(post.author_id, actor) {
        tracing::warn!("Delete of post {} refused for non-author {}", post_id, actor);
        return Err(BackendError::forbidden("not_owner"));
    }

    let summary = remove_post(store, &post).await.map_err(|e| {
        BackendError::internal(format!("cascade delete failed for post {}: {}", post_id, e))
    })?;

    tracing::info!(
        "Post {} deleted by author ({} reactions, {} comments removed)",
        post_id,
        summary.reactions,
        summary.comments
    );
    Ok(summary)
}

pub async fn list(
    store: &dyn Store,
    query: PostQuery,
    now: DateTime<Utc>,
) -> BackendResult<Vec<PostView>> {
    let posts = store.list_posts(query, now).await?;
    decorate(store, posts).await
}

/// Attach author and room display fields
pub async fn decorate(store: &dyn Store, posts: Vec<Post>) -> BackendResult<Vec<PostView>> {
    let mut cache = ProfileCache::new(store);
    let mut views = Vec::with_capacity(posts.len());
    for post in posts {
        let author = cache.author(post.author_id).await?;
        let room = cache.room(post.room_id).await?;
        views.push(PostView::new(post, author, room));
    }
    Ok(views)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_author_compares_identity() {
        let id = Uuid::new_v4();
        assert!(is_author(id, &id.to_string()));
        assert!(is_author(id, &id.to_string().to_uppercase()));
        assert!(!is_author(id, &Uuid::new_v4().to_string()));
        assert!(!is_author(id, "demo-user"));
    }
}
