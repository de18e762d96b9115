//! Comment Data Structure

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A comment on a post, optionally replying to a top-level comment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    /// Set for replies; replies to replies are rejected
    pub parent_comment_id: Option<Uuid>,
    pub content: String,
    /// Soft-delete marker
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(
        post_id: Uuid,
        author_id: Uuid,
        parent_comment_id: Option<Uuid>,
        content: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            post_id,
            author_id,
            parent_comment_id,
            content: content.into(),
            is_deleted: false,
            created_at: now,
        }
    }

    pub fn is_reply(&self) -> bool {
        self.parent_comment_id.is_some()
    }
}
