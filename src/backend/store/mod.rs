/**
 * Entity Store
 *
 * Durable storage for every collection the service owns: users, rooms,
 * posts, reactions, comments, badges and earned badges.
 *
 * # Contract
 *
 * - Writes that would break a uniqueness rule fail with
 *   `StoreError::ConstraintViolation`. The rules are: user email, user
 *   anonymous id, room name, badge name, one reaction per (post, user)
 *   and one earned badge per (user, badge).
 * - Reads never fail for a missing row. They return `None` or an empty
 *   list and callers decide whether that is a `NotFound`.
 * - Counter adjustments are single-row atomic increments clamped at
 *   zero. There is no cross-row transaction.
 *
 * # Implementations
 *
 * - `PgStore` - PostgreSQL through sqlx, schema managed by `sqlx::migrate!()`
 * - `MemoryStore` - process-local tables, used when no database is
 *   configured and by the test suites
 */

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::shared::{
    Badge, Comment, Post, PostDuration, Reaction, ReactionType, Room, SharedError, User, UserBadge,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Constraint names shared by both implementations
pub mod constraints {
    pub const USER_EMAIL: &str = "users_email_key";
    pub const USER_ANONYMOUS_ID: &str = "users_anonymous_id_key";
    pub const ROOM_NAME: &str = "rooms_name_key";
    pub const BADGE_NAME: &str = "badges_name_key";
    pub const REACTION_POST_USER: &str = "reactions_post_id_user_id_key";
    pub const USER_BADGE_PAIR: &str = "user_badges_user_id_badge_id_key";
    pub const REACTION_POST: &str = "reactions_post_id_fkey";
    pub const COMMENT_POST: &str = "comments_post_id_fkey";
}

/// Errors raised by the entity store
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness rule rejected the write
    #[error("constraint violated: {constraint}")]
    ConstraintViolation {
        /// Name of the violated constraint
        constraint: String,
    },

    /// The backing database reported an error
    #[error("database error: {0}")]
    Database(sqlx::Error),

    /// The store could not be reached
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A stored value could not be decoded into a domain type
    #[error("corrupt record: {0}")]
    Corrupt(#[from] SharedError),
}

impl StoreError {
    pub fn constraint(name: impl Into<String>) -> Self {
        Self::ConstraintViolation {
            constraint: name.into(),
        }
    }

    /// Whether this is any uniqueness or reference failure
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Self::ConstraintViolation { .. })
    }

    /// Whether this is a failure on the named constraint
    pub fn violates(&self, name: &str) -> bool {
        matches!(self, Self::ConstraintViolation { constraint } if constraint == name)
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => Self::ConstraintViolation {
                constraint: db.constraint().unwrap_or("unique").to_string(),
            },
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => Self::ConstraintViolation {
                constraint: db.constraint().unwrap_or("foreign_key").to_string(),
            },
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                Self::Unavailable(err.to_string())
            }
            _ => Self::Database(err),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Counter changes applied to a single user row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserCounterDelta {
    pub posts: i64,
    pub reactions: i64,
    /// When set, `last_active_at` is moved to this instant
    pub touched_at: Option<DateTime<Utc>>,
}

impl UserCounterDelta {
    pub fn posts(delta: i64) -> Self {
        Self {
            posts: delta,
            ..Self::default()
        }
    }

    pub fn reactions(delta: i64) -> Self {
        Self {
            reactions: delta,
            ..Self::default()
        }
    }

    pub fn touched(mut self, at: DateTime<Utc>) -> Self {
        self.touched_at = Some(at);
        self
    }
}

/// Filter and page for post listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostQuery {
    pub room_id: Option<Uuid>,
    pub limit: i64,
    pub offset: i64,
}

impl Default for PostQuery {
    fn default() -> Self {
        Self {
            room_id: None,
            limit: 20,
            offset: 0,
        }
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert_user(&self, user: &User) -> StoreResult<()>;
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    /// All users, newest first
    async fn list_users(&self) -> StoreResult<Vec<User>>;
    async fn adjust_user_counters(&self, id: Uuid, delta: UserCounterDelta) -> StoreResult<()>;
    /// Set alias and anonymous id only where they are still unset, returning the stored row
    async fn assign_identity_if_absent(
        &self,
        id: Uuid,
        alias: &str,
        anonymous_id: &str,
    ) -> StoreResult<Option<User>>;
}

#[async_trait]
pub trait RoomStore: Send + Sync {
    async fn insert_room(&self, room: &Room) -> StoreResult<()>;
    async fn find_room(&self, id: Uuid) -> StoreResult<Option<Room>>;
    /// Rooms ordered by trending, member count, then last activity, all descending
    async fn list_rooms(&self, trending_only: bool) -> StoreResult<Vec<Room>>;
    async fn adjust_room_posts(
        &self,
        id: Uuid,
        delta: i64,
        touched_at: Option<DateTime<Utc>>,
    ) -> StoreResult<()>;
}

#[async_trait]
pub trait PostStore: Send + Sync {
    async fn insert_post(&self, post: &Post) -> StoreResult<()>;
    async fn find_post(&self, id: Uuid) -> StoreResult<Option<Post>>;
    /// Live posts at `now`, newest first
    async fn list_posts(&self, query: PostQuery, now: DateTime<Utc>) -> StoreResult<Vec<Post>>;
    /// Every stored post by an author, oldest first
    async fn list_posts_by_author(&self, author_id: Uuid) -> StoreResult<Vec<Post>>;
    /// Posts whose expiry instant is at or before `now`
    async fn list_expired_posts(&self, now: DateTime<Utc>) -> StoreResult<Vec<Post>>;
    /// Set the soft marker on posts past expiry, returning how many changed
    async fn mark_expired(&self, now: DateTime<Utc>) -> StoreResult<u64>;
    /// Remove the post row together with any reactions or comments still
    /// attached to it. Later inserts referencing the post are rejected.
    async fn delete_post(&self, id: Uuid) -> StoreResult<bool>;
    /// Give posts lacking an expiry `created_at + window`, returning how many changed
    async fn backfill_expiry(&self, window: Duration, duration: PostDuration) -> StoreResult<u64>;
}

#[async_trait]
pub trait ReactionStore: Send + Sync {
    async fn find_reaction(&self, post_id: Uuid, user_id: Uuid) -> StoreResult<Option<Reaction>>;
    async fn insert_reaction(&self, reaction: &Reaction) -> StoreResult<()>;
    async fn update_reaction_type(
        &self,
        id: Uuid,
        reaction_type: ReactionType,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<Reaction>>;
    async fn delete_reaction(&self, id: Uuid) -> StoreResult<bool>;
    /// Reactions on a post, oldest first
    async fn list_reactions_for_post(&self, post_id: Uuid) -> StoreResult<Vec<Reaction>>;
    /// Total reactions across a set of posts
    async fn count_reactions_on_posts(&self, post_ids: &[Uuid]) -> StoreResult<i64>;
    async fn delete_reactions_for_post(&self, post_id: Uuid) -> StoreResult<u64>;
}

#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn insert_comment(&self, comment: &Comment) -> StoreResult<()>;
    async fn find_comment(&self, id: Uuid) -> StoreResult<Option<Comment>>;
    /// Every comment on a post including soft-deleted ones, oldest first
    async fn list_comments_for_post(&self, post_id: Uuid) -> StoreResult<Vec<Comment>>;
    async fn soft_delete_comment(&self, id: Uuid) -> StoreResult<bool>;
    async fn delete_comments_for_post(&self, post_id: Uuid) -> StoreResult<u64>;
}

#[async_trait]
pub trait BadgeStore: Send + Sync {
    async fn insert_badge(&self, badge: &Badge) -> StoreResult<()>;
    /// Active catalog badges in creation order
    async fn list_active_badges(&self) -> StoreResult<Vec<Badge>>;
    async fn list_user_badges(&self, user_id: Uuid) -> StoreResult<Vec<UserBadge>>;
    async fn insert_user_badge(&self, user_badge: &UserBadge) -> StoreResult<()>;
}

/// The full entity store
#[async_trait]
pub trait Store: UserStore + RoomStore + PostStore + ReactionStore + CommentStore + BadgeStore {
    /// Cheap connectivity probe
    async fn ping(&self) -> StoreResult<()>;

    /// Short label for logs and health output
    fn backend_name(&self) -> &'static str;
}
