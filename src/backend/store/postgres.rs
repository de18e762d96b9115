/**
 * PostgreSQL Entity Store
 *
 * sqlx-backed implementation of the store traits. Rows are mapped by hand
 * so the text columns holding enumerations (`duration`, `reaction_type`,
 * `rarity`) go through the domain parsers and surface as
 * `StoreError::Corrupt` if the database holds something unexpected.
 *
 * Counter updates are single `UPDATE ... SET x = GREATEST(x + $n, 0)`
 * statements, so concurrent adjustments on the same row never lose
 * increments even though nothing spans rows.
 */

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::{
    BadgeStore, CommentStore, PostQuery, PostStore, ReactionStore, RoomStore, Store, StoreResult,
    UserCounterDelta, UserStore,
};
use crate::shared::{
    Badge, BadgeRequirements, Comment, Post, PostDuration, Rarity, Reaction, ReactionType, Room,
    User, UserBadge,
};

const USER_COLUMNS: &str = "id, name, email, password_hash, alias, anonymous_id, total_posts, \
     total_reactions, last_active_at, created_at";
const ROOM_COLUMNS: &str = "id, name, description, icon, gradient, category, is_trending, \
     member_count, recent_post_count, last_activity, created_at";
const POST_COLUMNS: &str = "id, title, content, author_id, room_id, category, duration, \
     is_voice_note, expires_at, is_expired, created_at";
const REACTION_COLUMNS: &str = "id, post_id, user_id, reaction_type, created_at, updated_at";
const COMMENT_COLUMNS: &str =
    "id, post_id, author_id, parent_comment_id, content, is_deleted, created_at";
const BADGE_COLUMNS: &str = "id, name, description, icon, rarity, posts_required, \
     reactions_required, days_active, required_category, is_active, created_at";

/// Entity store backed by a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn user_from_row(row: &PgRow) -> StoreResult<User> {
    Ok(User {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        alias: row.try_get("alias")?,
        anonymous_id: row.try_get("anonymous_id")?,
        total_posts: row.try_get("total_posts")?,
        total_reactions: row.try_get("total_reactions")?,
        last_active_at: row.try_get("last_active_at")?,
        created_at: row.try_get("created_at")?,
    })
}

fn room_from_row(row: &PgRow) -> StoreResult<Room> {
    Ok(Room {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        icon: row.try_get("icon")?,
        gradient: row.try_get("gradient")?,
        category: row.try_get("category")?,
        is_trending: row.try_get("is_trending")?,
        member_count: row.try_get("member_count")?,
        recent_post_count: row.try_get("recent_post_count")?,
        last_activity: row.try_get("last_activity")?,
        created_at: row.try_get("created_at")?,
    })
}

fn post_from_row(row: &PgRow) -> StoreResult<Post> {
    let duration: String = row.try_get("duration")?;
    Ok(Post {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        author_id: row.try_get("author_id")?,
        room_id: row.try_get("room_id")?,
        category: row.try_get("category")?,
        duration: duration.parse::<PostDuration>()?,
        is_voice_note: row.try_get("is_voice_note")?,
        expires_at: row.try_get("expires_at")?,
        is_expired: row.try_get("is_expired")?,
        created_at: row.try_get("created_at")?,
    })
}

fn reaction_from_row(row: &PgRow) -> StoreResult<Reaction> {
    let reaction_type: String = row.try_get("reaction_type")?;
    Ok(Reaction {
        id: row.try_get("id")?,
        post_id: row.try_get("post_id")?,
        user_id: row.try_get("user_id")?,
        reaction_type: reaction_type.parse::<ReactionType>()?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn comment_from_row(row: &PgRow) -> StoreResult<Comment> {
    Ok(Comment {
        id: row.try_get("id")?,
        post_id: row.try_get("post_id")?,
        author_id: row.try_get("author_id")?,
        parent_comment_id: row.try_get("parent_comment_id")?,
        content: row.try_get("content")?,
        is_deleted: row.try_get("is_deleted")?,
        created_at: row.try_get("created_at")?,
    })
}

fn badge_from_row(row: &PgRow) -> StoreResult<Badge> {
    let rarity: String = row.try_get("rarity")?;
    Ok(Badge {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        icon: row.try_get("icon")?,
        rarity: rarity.parse::<Rarity>()?,
        requirements: BadgeRequirements {
            posts_required: row.try_get("posts_required")?,
            reactions_required: row.try_get("reactions_required")?,
            days_active: row.try_get("days_active")?,
            category: row.try_get("required_category")?,
        },
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
    })
}

fn user_badge_from_row(row: &PgRow) -> StoreResult<UserBadge> {
    Ok(UserBadge {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        badge_id: row.try_get("badge_id")?,
        earned_at: row.try_get("earned_at")?,
    })
}

fn collect<T>(rows: Vec<PgRow>, map: fn(&PgRow) -> StoreResult<T>) -> StoreResult<Vec<T>> {
    rows.iter().map(map).collect()
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, alias, anonymous_id,
                               total_posts, total_reactions, last_active_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.alias)
        .bind(&user.anonymous_id)
        .bind(user.total_posts)
        .bind(user.total_reactions)
        .bind(user.last_active_at)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM users ORDER BY created_at DESC",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        collect(rows, user_from_row)
    }

    async fn adjust_user_counters(&self, id: Uuid, delta: UserCounterDelta) -> StoreResult<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET total_posts = GREATEST(total_posts + $2, 0),
                total_reactions = GREATEST(total_reactions + $3, 0),
                last_active_at = COALESCE($4, last_active_at)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(delta.posts)
        .bind(delta.reactions)
        .bind(delta.touched_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn assign_identity_if_absent(
        &self,
        id: Uuid,
        alias: &str,
        anonymous_id: &str,
    ) -> StoreResult<Option<User>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE users
            SET alias = COALESCE(alias, $2),
                anonymous_id = COALESCE(anonymous_id, $3)
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(id)
        .bind(alias)
        .bind(anonymous_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(user_from_row).transpose()
    }
}

#[async_trait]
impl RoomStore for PgStore {
    async fn insert_room(&self, room: &Room) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO rooms (id, name, description, icon, gradient, category, is_trending,
                               member_count, recent_post_count, last_activity, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(room.id)
        .bind(&room.name)
        .bind(&room.description)
        .bind(&room.icon)
        .bind(&room.gradient)
        .bind(&room.category)
        .bind(room.is_trending)
        .bind(room.member_count)
        .bind(room.recent_post_count)
        .bind(room.last_activity)
        .bind(room.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_room(&self, id: Uuid) -> StoreResult<Option<Room>> {
        let row = sqlx::query(&format!("SELECT {} FROM rooms WHERE id = $1", ROOM_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(room_from_row).transpose()
    }

    async fn list_rooms(&self, trending_only: bool) -> StoreResult<Vec<Room>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM rooms
            WHERE ($1 = FALSE OR is_trending = TRUE)
            ORDER BY is_trending DESC, member_count DESC, last_activity DESC
            "#,
            ROOM_COLUMNS
        ))
        .bind(trending_only)
        .fetch_all(&self.pool)
        .await?;
        collect(rows, room_from_row)
    }

    async fn adjust_room_posts(
        &self,
        id: Uuid,
        delta: i64,
        touched_at: Option<DateTime<Utc>>,
    ) -> StoreResult<()> {
        sqlx::query(
            r#"
            UPDATE rooms
            SET recent_post_count = GREATEST(recent_post_count + $2, 0),
                last_activity = COALESCE($3, last_activity)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(delta)
        .bind(touched_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl PostStore for PgStore {
    async fn insert_post(&self, post: &Post) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO posts (id, title, content, author_id, room_id, category, duration,
                               is_voice_note, expires_at, is_expired, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(post.id)
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.author_id)
        .bind(post.room_id)
        .bind(&post.category)
        .bind(post.duration.as_str())
        .bind(post.is_voice_note)
        .bind(post.expires_at)
        .bind(post.is_expired)
        .bind(post.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_post(&self, id: Uuid) -> StoreResult<Option<Post>> {
        let row = sqlx::query(&format!("SELECT {} FROM posts WHERE id = $1", POST_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(post_from_row).transpose()
    }

    async fn list_posts(&self, query: PostQuery, now: DateTime<Utc>) -> StoreResult<Vec<Post>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM posts
            WHERE is_expired = FALSE
              AND (expires_at IS NULL OR expires_at > $1)
              AND ($2::uuid IS NULL OR room_id = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
            POST_COLUMNS
        ))
        .bind(now)
        .bind(query.room_id)
        .bind(query.limit)
        .bind(query.offset)
        .fetch_all(&self.pool)
        .await?;
        collect(rows, post_from_row)
    }

    async fn list_posts_by_author(&self, author_id: Uuid) -> StoreResult<Vec<Post>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM posts WHERE author_id = $1 ORDER BY created_at ASC",
            POST_COLUMNS
        ))
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;
        collect(rows, post_from_row)
    }

    async fn list_expired_posts(&self, now: DateTime<Utc>) -> StoreResult<Vec<Post>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM posts WHERE expires_at IS NOT NULL AND expires_at <= $1",
            POST_COLUMNS
        ))
        .bind(now)
        .fetch_all(&self.pool)
        .await?;
        collect(rows, post_from_row)
    }

    async fn mark_expired(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE posts SET is_expired = TRUE
            WHERE is_expired = FALSE AND expires_at IS NOT NULL AND expires_at <= $1
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete_post(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn backfill_expiry(&self, window: Duration, duration: PostDuration) -> StoreResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE posts
            SET expires_at = created_at + make_interval(secs => $1),
                duration = $2
            WHERE expires_at IS NULL
            "#,
        )
        .bind(window.num_seconds() as f64)
        .bind(duration.as_str())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl ReactionStore for PgStore {
    async fn find_reaction(&self, post_id: Uuid, user_id: Uuid) -> StoreResult<Option<Reaction>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM reactions WHERE post_id = $1 AND user_id = $2",
            REACTION_COLUMNS
        ))
        .bind(post_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(reaction_from_row).transpose()
    }

    async fn insert_reaction(&self, reaction: &Reaction) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO reactions (id, post_id, user_id, reaction_type, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(reaction.id)
        .bind(reaction.post_id)
        .bind(reaction.user_id)
        .bind(reaction.reaction_type.as_str())
        .bind(reaction.created_at)
        .bind(reaction.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_reaction_type(
        &self,
        id: Uuid,
        reaction_type: ReactionType,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<Reaction>> {
        let row = sqlx::query(&format!(
            "UPDATE reactions SET reaction_type = $2, updated_at = $3 WHERE id = $1 RETURNING {}",
            REACTION_COLUMNS
        ))
        .bind(id)
        .bind(reaction_type.as_str())
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(reaction_from_row).transpose()
    }

    async fn delete_reaction(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM reactions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_reactions_for_post(&self, post_id: Uuid) -> StoreResult<Vec<Reaction>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM reactions WHERE post_id = $1 ORDER BY created_at ASC",
            REACTION_COLUMNS
        ))
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;
        collect(rows, reaction_from_row)
    }

    async fn count_reactions_on_posts(&self, post_ids: &[Uuid]) -> StoreResult<i64> {
        if post_ids.is_empty() {
            return Ok(0);
        }
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reactions WHERE post_id = ANY($1)")
            .bind(post_ids)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn delete_reactions_for_post(&self, post_id: Uuid) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM reactions WHERE post_id = $1")
            .bind(post_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl CommentStore for PgStore {
    async fn insert_comment(&self, comment: &Comment) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO comments (id, post_id, author_id, parent_comment_id, content, is_deleted, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(comment.id)
        .bind(comment.post_id)
        .bind(comment.author_id)
        .bind(comment.parent_comment_id)
        .bind(&comment.content)
        .bind(comment.is_deleted)
        .bind(comment.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_comment(&self, id: Uuid) -> StoreResult<Option<Comment>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM comments WHERE id = $1",
            COMMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(comment_from_row).transpose()
    }

    async fn list_comments_for_post(&self, post_id: Uuid) -> StoreResult<Vec<Comment>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM comments WHERE post_id = $1 ORDER BY created_at ASC",
            COMMENT_COLUMNS
        ))
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;
        collect(rows, comment_from_row)
    }

    async fn soft_delete_comment(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE comments SET is_deleted = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_comments_for_post(&self, post_id: Uuid) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM comments WHERE post_id = $1")
            .bind(post_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl BadgeStore for PgStore {
    async fn insert_badge(&self, badge: &Badge) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO badges (id, name, description, icon, rarity, posts_required,
                                reactions_required, days_active, required_category,
                                is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(badge.id)
        .bind(&badge.name)
        .bind(&badge.description)
        .bind(&badge.icon)
        .bind(badge.rarity.as_str())
        .bind(badge.requirements.posts_required)
        .bind(badge.requirements.reactions_required)
        .bind(badge.requirements.days_active)
        .bind(&badge.requirements.category)
        .bind(badge.is_active)
        .bind(badge.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_active_badges(&self) -> StoreResult<Vec<Badge>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM badges WHERE is_active = TRUE ORDER BY created_at ASC, name ASC",
            BADGE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        collect(rows, badge_from_row)
    }

    async fn list_user_badges(&self, user_id: Uuid) -> StoreResult<Vec<UserBadge>> {
        let rows = sqlx::query(
            "SELECT id, user_id, badge_id, earned_at FROM user_badges WHERE user_id = $1 ORDER BY earned_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        collect(rows, user_badge_from_row)
    }

    async fn insert_user_badge(&self, user_badge: &UserBadge) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO user_badges (id, user_id, badge_id, earned_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(user_badge.id)
        .bind(user_badge.user_id)
        .bind(user_badge.badge_id)
        .bind(user_badge.earned_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
