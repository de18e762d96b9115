use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::backend::store::{Store, StoreResult};
use crate::backend::views::{AuthorView, ProfileCache};
use crate::shared::Comment;

/// A comment as shown to clients, with replies nested under it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub author: Option<AuthorView>,
    pub content: String,
    pub parent_comment_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replies: Option<Vec<CommentView>>,
}

impl CommentView {
    pub fn new(comment: Comment, author: Option<AuthorView>) -> Self {
        Self {
            id: comment.id,
            post_id: comment.post_id,
            author_id: comment.author_id,
            author,
            content: comment.content,
            parent_comment_id: comment.parent_comment_id,
            created_at: comment.created_at,
            replies: None,
        }
    }
}

/// Split a post's comments into visible top-level comments (newest first)
/// and their visible replies (oldest first)
///
/// Replies whose parent is deleted or missing are not shown.
pub fn arrange(comments: Vec<Comment>) -> Vec<(Comment, Vec<Comment>)> {
    let mut top_level = Vec::new();
    let mut replies: HashMap<Uuid, Vec<Comment>> = HashMap::new();

    for comment in comments.into_iter().filter(|c| !c.is_deleted) {
        match comment.parent_comment_id {
            Some(parent) => replies.entry(parent).or_default().push(comment),
            None => top_level.push(comment),
        }
    }

    top_level.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    top_level
        .into_iter()
        .map(|comment| {
            let mut children = replies.remove(&comment.id).unwrap_or_default();
            children.sort_by(|a, b| a.created_at.cmp(&b.created_at));
            (comment, children)
        })
        .collect()
}

/// Visible thread for a post with author display fields attached
pub async fn build_thread(store: &dyn Store, post_id: Uuid) -> StoreResult<Vec<CommentView>> {
    let comments = store.list_comments_for_post(post_id).await?;
    let mut cache = ProfileCache::new(store);
    let mut thread = Vec::new();

    for (comment, children) in arrange(comments) {
        let mut replies = Vec::with_capacity(children.len());
        for reply in children {
            let author = cache.author(reply.author_id).await?;
            replies.push(CommentView::new(reply, author));
        }
        let author = cache.author(comment.author_id).await?;
        let mut view = CommentView::new(comment, author);
        view.replies = Some(replies);
        thread.push(view);
    }

    Ok(thread)
}
