/**
 * In-Memory Entity Store
 *
 * Process-local tables behind a single `tokio::sync::RwLock`. Each table is
 * a `Vec` kept in insertion order so listings are deterministic when
 * timestamps tie. Uniqueness rules are enforced on every write with the
 * same constraint names the PostgreSQL schema uses. Reactions and comments
 * must reference a stored post, and removing a post drops whatever is still
 * attached to it under the same write lock.
 *
 * Data does not survive a restart. The server falls back to this store
 * when no database is configured.
 */

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    constraints, BadgeStore, CommentStore, PostQuery, PostStore, ReactionStore, RoomStore, Store,
    StoreError, StoreResult, UserCounterDelta, UserStore,
};
use crate::shared::{
    Badge, Comment, Post, PostDuration, Reaction, ReactionType, Room, User, UserBadge,
};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    rooms: Vec<Room>,
    posts: Vec<Post>,
    reactions: Vec<Reaction>,
    comments: Vec<Comment>,
    badges: Vec<Badge>,
    user_badges: Vec<UserBadge>,
}

/// Process-local entity store
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    #[cfg(test)]
    failing_cascades: std::sync::Mutex<std::collections::HashSet<Uuid>>,
    #[cfg(test)]
    late_reactions: std::sync::Mutex<Vec<Reaction>>,
    #[cfg(test)]
    late_awards: std::sync::Mutex<Vec<UserBadge>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make cascade deletes for `post_id` fail until the store is dropped
    #[cfg(test)]
    pub(crate) fn fail_cascade_for(&self, post_id: Uuid) {
        if let Ok(mut failing) = self.failing_cascades.lock() {
            failing.insert(post_id);
        }
    }

    /// Commit `reaction` while its post's comments are being removed, after
    /// the reactions pass of a cascade has already run
    #[cfg(test)]
    pub(crate) fn react_during_cascade(&self, reaction: Reaction) {
        if let Ok(mut late) = self.late_reactions.lock() {
            late.push(reaction);
        }
    }

    #[cfg(test)]
    fn take_late_reactions(&self, post_id: Uuid) -> Vec<Reaction> {
        match self.late_reactions.lock() {
            Ok(mut late) => {
                let (due, rest): (Vec<Reaction>, Vec<Reaction>) =
                    late.drain(..).partition(|r| r.post_id == post_id);
                *late = rest;
                due
            }
            Err(_) => Vec::new(),
        }
    }

    #[cfg(not(test))]
    fn take_late_reactions(&self, _post_id: Uuid) -> Vec<Reaction> {
        Vec::new()
    }

    /// Commit `user_badge` right after the next read of that user's badges,
    /// so the reader works from a snapshot that misses it
    #[cfg(test)]
    pub(crate) fn award_after_read(&self, user_badge: UserBadge) {
        if let Ok(mut late) = self.late_awards.lock() {
            late.push(user_badge);
        }
    }

    #[cfg(test)]
    fn take_late_awards(&self, user_id: Uuid) -> Vec<UserBadge> {
        match self.late_awards.lock() {
            Ok(mut late) => {
                let (due, rest): (Vec<UserBadge>, Vec<UserBadge>) =
                    late.drain(..).partition(|ub| ub.user_id == user_id);
                *late = rest;
                due
            }
            Err(_) => Vec::new(),
        }
    }

    #[cfg(not(test))]
    fn take_late_awards(&self, _user_id: Uuid) -> Vec<UserBadge> {
        Vec::new()
    }

    #[cfg(test)]
    fn check_cascade(&self, post_id: Uuid) -> StoreResult<()> {
        let failing = self
            .failing_cascades
            .lock()
            .map(|set| set.contains(&post_id))
            .unwrap_or(false);
        if failing {
            return Err(StoreError::Unavailable(format!(
                "injected cascade failure for post {}",
                post_id
            )));
        }
        Ok(())
    }

    #[cfg(not(test))]
    fn check_cascade(&self, _post_id: Uuid) -> StoreResult<()> {
        Ok(())
    }
}

fn clamp_add(value: i64, delta: i64) -> i64 {
    value.saturating_add(delta).max(0)
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::constraint(constraints::USER_EMAIL));
        }
        if let Some(anonymous_id) = &user.anonymous_id {
            if tables
                .users
                .iter()
                .any(|u| u.anonymous_id.as_ref() == Some(anonymous_id))
            {
                return Err(StoreError::constraint(constraints::USER_ANONYMOUS_ID));
            }
        }
        tables.users.push(user.clone());
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let tables = self.tables.read().await;
        let mut users: Vec<User> = tables.users.iter().rev().cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn adjust_user_counters(&self, id: Uuid, delta: UserCounterDelta) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if let Some(user) = tables.users.iter_mut().find(|u| u.id == id) {
            user.total_posts = clamp_add(user.total_posts, delta.posts);
            user.total_reactions = clamp_add(user.total_reactions, delta.reactions);
            if let Some(at) = delta.touched_at {
                user.last_active_at = at;
            }
        }
        Ok(())
    }

    async fn assign_identity_if_absent(
        &self,
        id: Uuid,
        alias: &str,
        anonymous_id: &str,
    ) -> StoreResult<Option<User>> {
        let mut tables = self.tables.write().await;
        let needs_anonymous_id = match tables.users.iter().find(|u| u.id == id) {
            Some(user) => user.anonymous_id.is_none(),
            None => return Ok(None),
        };
        if needs_anonymous_id
            && tables
                .users
                .iter()
                .any(|u| u.anonymous_id.as_deref() == Some(anonymous_id))
        {
            return Err(StoreError::constraint(constraints::USER_ANONYMOUS_ID));
        }
        let user = match tables.users.iter_mut().find(|u| u.id == id) {
            Some(user) => user,
            None => return Ok(None),
        };
        if user.alias.is_none() {
            user.alias = Some(alias.to_string());
        }
        if user.anonymous_id.is_none() {
            user.anonymous_id = Some(anonymous_id.to_string());
        }
        Ok(Some(user.clone()))
    }
}

#[async_trait]
impl RoomStore for MemoryStore {
    async fn insert_room(&self, room: &Room) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.rooms.iter().any(|r| r.name == room.name) {
            return Err(StoreError::constraint(constraints::ROOM_NAME));
        }
        tables.rooms.push(room.clone());
        Ok(())
    }

    async fn find_room(&self, id: Uuid) -> StoreResult<Option<Room>> {
        let tables = self.tables.read().await;
        Ok(tables.rooms.iter().find(|r| r.id == id).cloned())
    }

    async fn list_rooms(&self, trending_only: bool) -> StoreResult<Vec<Room>> {
        let tables = self.tables.read().await;
        let mut rooms: Vec<Room> = tables
            .rooms
            .iter()
            .filter(|r| !trending_only || r.is_trending)
            .cloned()
            .collect();
        rooms.sort_by(|a, b| {
            b.is_trending
                .cmp(&a.is_trending)
                .then(b.member_count.cmp(&a.member_count))
                .then(b.last_activity.cmp(&a.last_activity))
        });
        Ok(rooms)
    }

    async fn adjust_room_posts(
        &self,
        id: Uuid,
        delta: i64,
        touched_at: Option<DateTime<Utc>>,
    ) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if let Some(room) = tables.rooms.iter_mut().find(|r| r.id == id) {
            room.recent_post_count = clamp_add(room.recent_post_count, delta);
            if let Some(at) = touched_at {
                room.last_activity = at;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn insert_post(&self, post: &Post) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.posts.push(post.clone());
        Ok(())
    }

    async fn find_post(&self, id: Uuid) -> StoreResult<Option<Post>> {
        let tables = self.tables.read().await;
        Ok(tables.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn list_posts(&self, query: PostQuery, now: DateTime<Utc>) -> StoreResult<Vec<Post>> {
        let tables = self.tables.read().await;
        let mut posts: Vec<Post> = tables
            .posts
            .iter()
            .rev()
            .filter(|p| p.is_live(now))
            .filter(|p| query.room_id.map_or(true, |room_id| p.room_id == room_id))
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts
            .into_iter()
            .skip(query.offset.max(0) as usize)
            .take(query.limit.max(0) as usize)
            .collect())
    }

    async fn list_posts_by_author(&self, author_id: Uuid) -> StoreResult<Vec<Post>> {
        let tables = self.tables.read().await;
        let mut posts: Vec<Post> = tables
            .posts
            .iter()
            .filter(|p| p.author_id == author_id)
            .cloned()
            .collect();
        posts.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(posts)
    }

    async fn list_expired_posts(&self, now: DateTime<Utc>) -> StoreResult<Vec<Post>> {
        let tables = self.tables.read().await;
        Ok(tables
            .posts
            .iter()
            .filter(|p| p.expires_at.map_or(false, |at| at <= now))
            .cloned()
            .collect())
    }

    async fn mark_expired(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;
        let mut changed = 0;
        for post in tables.posts.iter_mut() {
            if !post.is_expired && post.expires_at.map_or(false, |at| at <= now) {
                post.is_expired = true;
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn delete_post(&self, id: Uuid) -> StoreResult<bool> {
        self.check_cascade(id)?;
        let mut tables = self.tables.write().await;
        let before = tables.posts.len();
        tables.posts.retain(|p| p.id != id);
        if tables.posts.len() == before {
            return Ok(false);
        }
        tables.reactions.retain(|r| r.post_id != id);
        tables.comments.retain(|c| c.post_id != id);
        Ok(true)
    }

    async fn backfill_expiry(&self, window: Duration, duration: PostDuration) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;
        let mut changed = 0;
        for post in tables.posts.iter_mut().filter(|p| p.expires_at.is_none()) {
            post.expires_at = Some(post.created_at + window);
            post.duration = duration;
            changed += 1;
        }
        Ok(changed)
    }
}

#[async_trait]
impl ReactionStore for MemoryStore {
    async fn find_reaction(&self, post_id: Uuid, user_id: Uuid) -> StoreResult<Option<Reaction>> {
        let tables = self.tables.read().await;
        Ok(tables
            .reactions
            .iter()
            .find(|r| r.post_id == post_id && r.user_id == user_id)
            .cloned())
    }

    async fn insert_reaction(&self, reaction: &Reaction) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.posts.iter().any(|p| p.id == reaction.post_id) {
            return Err(StoreError::constraint(constraints::REACTION_POST));
        }
        if tables
            .reactions
            .iter()
            .any(|r| r.post_id == reaction.post_id && r.user_id == reaction.user_id)
        {
            return Err(StoreError::constraint(constraints::REACTION_POST_USER));
        }
        tables.reactions.push(reaction.clone());
        Ok(())
    }

    async fn update_reaction_type(
        &self,
        id: Uuid,
        reaction_type: ReactionType,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<Reaction>> {
        let mut tables = self.tables.write().await;
        Ok(tables.reactions.iter_mut().find(|r| r.id == id).map(|r| {
            r.reaction_type = reaction_type;
            r.updated_at = now;
            r.clone()
        }))
    }

    async fn delete_reaction(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.reactions.len();
        tables.reactions.retain(|r| r.id != id);
        Ok(tables.reactions.len() != before)
    }

    async fn list_reactions_for_post(&self, post_id: Uuid) -> StoreResult<Vec<Reaction>> {
        let tables = self.tables.read().await;
        let mut reactions: Vec<Reaction> = tables
            .reactions
            .iter()
            .filter(|r| r.post_id == post_id)
            .cloned()
            .collect();
        reactions.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(reactions)
    }

    async fn count_reactions_on_posts(&self, post_ids: &[Uuid]) -> StoreResult<i64> {
        let tables = self.tables.read().await;
        Ok(tables
            .reactions
            .iter()
            .filter(|r| post_ids.contains(&r.post_id))
            .count() as i64)
    }

    async fn delete_reactions_for_post(&self, post_id: Uuid) -> StoreResult<u64> {
        self.check_cascade(post_id)?;
        let mut tables = self.tables.write().await;
        let before = tables.reactions.len();
        tables.reactions.retain(|r| r.post_id != post_id);
        Ok((before - tables.reactions.len()) as u64)
    }
}

#[async_trait]
impl CommentStore for MemoryStore {
    async fn insert_comment(&self, comment: &Comment) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.posts.iter().any(|p| p.id == comment.post_id) {
            return Err(StoreError::constraint(constraints::COMMENT_POST));
        }
        tables.comments.push(comment.clone());
        Ok(())
    }

    async fn find_comment(&self, id: Uuid) -> StoreResult<Option<Comment>> {
        let tables = self.tables.read().await;
        Ok(tables.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn list_comments_for_post(&self, post_id: Uuid) -> StoreResult<Vec<Comment>> {
        let tables = self.tables.read().await;
        let mut comments: Vec<Comment> = tables
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(comments)
    }

    async fn soft_delete_comment(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.comments.iter_mut().find(|c| c.id == id) {
            Some(comment) => {
                comment.is_deleted = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_comments_for_post(&self, post_id: Uuid) -> StoreResult<u64> {
        self.check_cascade(post_id)?;
        for reaction in self.take_late_reactions(post_id) {
            self.insert_reaction(&reaction).await?;
        }
        let mut tables = self.tables.write().await;
        let before = tables.comments.len();
        tables.comments.retain(|c| c.post_id != post_id);
        Ok((before - tables.comments.len()) as u64)
    }
}

#[async_trait]
impl BadgeStore for MemoryStore {
    async fn insert_badge(&self, badge: &Badge) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.badges.iter().any(|b| b.name == badge.name) {
            return Err(StoreError::constraint(constraints::BADGE_NAME));
        }
        tables.badges.push(badge.clone());
        Ok(())
    }

    async fn list_active_badges(&self) -> StoreResult<Vec<Badge>> {
        let tables = self.tables.read().await;
        Ok(tables.badges.iter().filter(|b| b.is_active).cloned().collect())
    }

    async fn list_user_badges(&self, user_id: Uuid) -> StoreResult<Vec<UserBadge>> {
        let earned: Vec<UserBadge> = {
            let tables = self.tables.read().await;
            tables
                .user_badges
                .iter()
                .filter(|ub| ub.user_id == user_id)
                .cloned()
                .collect()
        };
        for user_badge in self.take_late_awards(user_id) {
            self.insert_user_badge(&user_badge).await?;
        }
        Ok(earned)
    }

    async fn insert_user_badge(&self, user_badge: &UserBadge) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables
            .user_badges
            .iter()
            .any(|ub| ub.user_id == user_badge.user_id && ub.badge_id == user_badge.badge_id)
        {
            return Err(StoreError::constraint(constraints::USER_BADGE_PAIR));
        }
        tables.user_badges.push(user_badge.clone());
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
