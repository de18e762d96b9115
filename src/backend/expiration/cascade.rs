//! Post removal cascade
//!
//! Order: reactions, comments, then the post itself. Any of those three
//! failing aborts the cascade and is reported to the caller; whatever was
//! already deleted stays deleted, and a retry (the next sweep, or the
//! author repeating the delete) finishes the job. Counter decrements run
//! only after the post row is gone and are best-effort.
//!
//! A reaction or comment committed while the cascade is running is removed
//! together with the post row, and once the row is gone the store rejects
//! new ones, so a finished cascade leaves nothing pointing at the post.

use crate::backend::store::{Store, StoreResult, UserCounterDelta};
use crate::shared::Post;

/// What a successful cascade removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeSummary {
    pub reactions: u64,
    pub comments: u64,
    /// False when another caller removed the post row first
    pub post_removed: bool,
}

pub async fn remove_post(store: &dyn Store, post: &Post) -> StoreResult<CascadeSummary> {
    let reactions = store.delete_reactions_for_post(post.id).await?;
    let comments = store.delete_comments_for_post(post.id).await?;
    let post_removed = store.delete_post(post.id).await?;

    if post_removed {
        if let Err(e) = store.adjust_room_posts(post.room_id, -1, None).await {
            tracing::warn!(
                "Failed to decrement post count for room {} after removing post {}: {}",
                post.room_id,
                post.id,
                e
            );
        }
        if let Err(e) = store
            .adjust_user_counters(post.author_id, UserCounterDelta::posts(-1))
            .await
        {
            tracing::warn!(
                "Failed to decrement post count for user {} after removing post {}: {}",
                post.author_id,
                post.id,
                e
            );
        }
    }

    tracing::debug!(
        "Removed post {} with {} reactions and {} comments",
        post.id,
        reactions,
        comments
    );

    Ok(CascadeSummary {
        reactions,
        comments,
        post_removed,
    })
}
