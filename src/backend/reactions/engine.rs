/**
 * Reaction Operations
 *
 * # React
 *
 * 1. The post must exist and still be live, and the user must exist
 * 2. No reaction yet: insert one and bump the user's counter
 * 3. Same type: return it unchanged
 * 4. Different type: overwrite the type in place
 *
 * Two concurrent first reactions from one user race on the unique
 * (post, user) index. The loser sees a constraint violation, re-reads the
 * winner's row and continues from step 3 or 4, so the last write decides
 * the type and the counter moves once.
 *
 * A post removed between the liveness check and the insert rejects the
 * insert, which is reported as `post_not_found`.
 *
 * # Unreact
 *
 * Removes the reaction only when the requested type matches the stored
 * one. A mismatch is reported with both types and leaves the row alone.
 */

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::backend::error::{BackendError, BackendResult};
use crate::backend::store::{constraints, Store, UserCounterDelta};
use crate::backend::views::{AuthorView, ProfileCache};
use crate::shared::{Reaction, ReactionType};

/// Attempts before giving up on a contended (post, user) pair
const REACT_ATTEMPTS: usize = 3;

/// What a React call did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReactOutcome {
    /// First reaction by this user on this post
    Created(Reaction),
    /// Same type as before, nothing written
    Unchanged(Reaction),
    /// Type switched in place
    Switched {
        reaction: Reaction,
        previous: ReactionType,
    },
}

impl ReactOutcome {
    pub fn reaction(&self) -> &Reaction {
        match self {
            Self::Created(reaction) | Self::Unchanged(reaction) => reaction,
            Self::Switched { reaction, .. } => reaction,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

pub async fn react(
    store: &dyn Store,
    post_id: Uuid,
    user_id: Uuid,
    reaction_type: ReactionType,
    now: DateTime<Utc>,
) -> BackendResult<ReactOutcome> {
    match store.find_post(post_id).await? {
        Some(post) if post.is_live(now) => {}
        _ => {
            tracing::warn!("Reaction rejected: post {} not found or expired", post_id);
            return Err(BackendError::not_found("post_not_found"));
        }
    }
    if store.find_user(user_id).await?.is_none() {
        tracing::warn!("Reaction rejected: user {} not found", user_id);
        return Err(BackendError::not_found("user_not_found"));
    }

    for _ in 0..REACT_ATTEMPTS {
        match store.find_reaction(post_id, user_id).await? {
            None => {
                let reaction = Reaction::new(post_id, user_id, reaction_type, now);
                match store.insert_reaction(&reaction).await {
                    Ok(()) => {
                        if let Err(e) = store
                            .adjust_user_counters(user_id, UserCounterDelta::reactions(1).touched(now))
                            .await
                        {
                            tracing::warn!(
                                "Failed to increment reaction count for user {}: {}",
                                user_id,
                                e
                            );
                        }
                        tracing::info!(
                            "Reaction {} added to post {} by {}",
                            reaction_type.as_str(),
                            post_id,
                            user_id
                        );
                        return Ok(ReactOutcome::Created(reaction));
                    }
                    Err(e) if e.violates(constraints::REACTION_POST_USER) => {
                        tracing::debug!("Concurrent reaction on post {} by {}, retrying", post_id, user_id);
                    }
                    Err(e) if e.violates(constraints::REACTION_POST) => {
                        tracing::warn!("Reaction rejected: post {} removed while reacting", post_id);
                        return Err(BackendError::not_found("post_not_found"));
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            Some(existing) if existing.reaction_type == reaction_type => {
                return Ok(ReactOutcome::Unchanged(existing));
            }
            Some(existing) => {
                if let Some(reaction) = store
                    .update_reaction_type(existing.id, reaction_type, now)
                    .await?
                {
                    tracing::info!(
                        "Reaction on post {} by {} switched from {} to {}",
                        post_id,
                        user_id,
                        existing.reaction_type.as_str(),
                        reaction_type.as_str()
                    );
                    return Ok(ReactOutcome::Switched {
                        reaction,
                        previous: existing.reaction_type,
                    });
                }
                tracing::debug!("Reaction {} vanished during switch, retrying", existing.id);
            }
        }
    }

    Err(BackendError::internal(format!(
        "reaction on post {} by {} kept changing underneath",
        post_id, user_id
    )))
}

pub async fn unreact(
    store: &dyn Store,
    post_id: Uuid,
    user_id: Uuid,
    reaction_type: ReactionType,
) -> BackendResult<Reaction> {
    let existing = store
        .find_reaction(post_id, user_id)
        .await?
        .ok_or_else(|| BackendError::not_found("reaction_not_found"))?;

    if existing.reaction_type != reaction_type {
        tracing::warn!(
            "Unreact rejected on post {}: current {}, requested {}",
            post_id,
            existing.reaction_type.as_str(),
            reaction_type.as_str()
        );
        return Err(BackendError::TypeMismatch {
            current: existing.reaction_type,
            requested: reaction_type,
        });
    }

    if !store.delete_reaction(existing.id).await? {
        return Err(BackendError::not_found("reaction_not_found"));
    }

    if let Err(e) = store
        .adjust_user_counters(user_id, UserCounterDelta::reactions(-1))
        .await
    {
        tracing::warn!("Failed to decrement reaction count for user {}: {}", user_id, e);
    }

    tracing::info!(
        "Reaction {} removed from post {} by {}",
        reaction_type.as_str(),
        post_id,
        user_id
    );
    Ok(existing)
}

/// Per-type counts, every type always present
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct ReactionCounts {
    pub tea: u64,
    pub spicy: u64,
    pub cap: u64,
    pub hearts: u64,
}

impl ReactionCounts {
    pub fn add(&mut self, reaction_type: ReactionType) {
        match reaction_type {
            ReactionType::Tea => self.tea += 1,
            ReactionType::Spicy => self.spicy += 1,
            ReactionType::Cap => self.cap += 1,
            ReactionType::Hearts => self.hearts += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.tea + self.spicy + self.cap + self.hearts
    }
}

/// One reaction in a post's listing
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionEntry {
    pub user_id: Uuid,
    pub user: Option<AuthorView>,
    pub reaction_type: ReactionType,
    pub created_at: DateTime<Utc>,
}

/// Everything GET /reactions/{postId} returns
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionSummary {
    pub post_id: Uuid,
    pub reactions: ReactionCounts,
    pub total_reactions: u64,
    pub user_reactions: Vec<ReactionEntry>,
    /// The requesting user's reaction, when a user was named
    pub user_reaction: Option<Reaction>,
}

pub async fn get_reactions(
    store: &dyn Store,
    post_id: Uuid,
    user_id: Option<Uuid>,
) -> BackendResult<ReactionSummary> {
    let reactions = store.list_reactions_for_post(post_id).await?;

    let mut counts = ReactionCounts::default();
    let mut cache = ProfileCache::new(store);
    let mut entries = Vec::with_capacity(reactions.len());
    for reaction in &reactions {
        counts.add(reaction.reaction_type);
        entries.push(ReactionEntry {
            user_id: reaction.user_id,
            user: cache.author(reaction.user_id).await?,
            reaction_type: reaction.reaction_type,
            created_at: reaction.created_at,
        });
    }

    let user_reaction = user_id.and_then(|id| reactions.iter().find(|r| r.user_id == id).cloned());

    Ok(ReactionSummary {
        post_id,
        reactions: counts,
        total_reactions: counts.total(),
        user_reactions: entries,
        user_reaction,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::store::{MemoryStore, PostStore, ReactionStore, RoomStore, UserStore};
    use crate::shared::models::post::DEFAULT_CATEGORY;
    use crate::shared::{Post, PostDuration, Room, User};
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    async fn seeded() -> (MemoryStore, Post, User) {
        let store = MemoryStore::new();
        let now = Utc::now();
        let user = User::new("Reactor", "react@example.com", "hash", now);
        let room = Room::new("Gaming", "games", None, None, now);
        let post = Post {
            id: Uuid::new_v4(),
            title: "t".into(),
            content: "c".into(),
            author_id: user.id,
            room_id: room.id,
            category: DEFAULT_CATEGORY.into(),
            duration: PostDuration::Day,
            is_voice_note: false,
            expires_at: Some(now + Duration::hours(24)),
            is_expired: false,
            created_at: now,
        };
        store.insert_user(&user).await.unwrap();
        store.insert_room(&room).await.unwrap();
        store.insert_post(&post).await.unwrap();
        (store, post, user)
    }

    async fn total_reactions(store: &MemoryStore, user: &User) -> i64 {
        store.find_user(user.id).await.unwrap().unwrap().total_reactions
    }

    #[tokio::test]
    async fn test_react_create_then_switch_keeps_one_row() {
        let (store, post, user) = seeded().await;
        let now = Utc::now();

        let first = react(&store, post.id, user.id, ReactionType::Tea, now).await.unwrap();
        assert!(first.is_created());
        let second = react(&store, post.id, user.id, ReactionType::Spicy, now).await.unwrap();
        assert!(matches!(
            second,
            ReactOutcome::Switched { previous: ReactionType::Tea, .. }
        ));
        assert_eq!(second.reaction().id, first.reaction().id);

        let rows = store.list_reactions_for_post(post.id).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].reaction_type, ReactionType::Spicy);
        assert_eq!(total_reactions(&store, &user).await, 1);
    }

    #[tokio::test]
    async fn test_react_same_type_is_noop() {
        let (store, post, user) = seeded().await;
        let now = Utc::now();
        react(&store, post.id, user.id, ReactionType::Cap, now).await.unwrap();
        let again = react(&store, post.id, user.id, ReactionType::Cap, now).await.unwrap();
        assert!(matches!(again, ReactOutcome::Unchanged(_)));
        assert_eq!(total_reactions(&store, &user).await, 1);
    }

    #[tokio::test]
    async fn test_react_on_expired_post_is_not_found() {
        let (store, post, user) = seeded().await;
        let later = post.expires_at.unwrap() + Duration::seconds(1);
        let err = react(&store, post.id, user.id, ReactionType::Tea, later)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "post_not_found");
    }

    #[tokio::test]
    async fn test_react_unknown_user() {
        let (store, post, _) = seeded().await;
        let err = react(&store, post.id, Uuid::new_v4(), ReactionType::Tea, Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "user_not_found");
    }

    #[tokio::test]
    async fn test_unreact_mismatch_leaves_reaction() {
        let (store, post, user) = seeded().await;
        react(&store, post.id, user.id, ReactionType::Spicy, Utc::now()).await.unwrap();

        let err = unreact(&store, post.id, user.id, ReactionType::Tea).await.unwrap_err();
        match err {
            BackendError::TypeMismatch { current, requested } => {
                assert_eq!(current, ReactionType::Spicy);
                assert_eq!(requested, ReactionType::Tea);
            }
            other => panic!("Expected TypeMismatch, got {:?}", other),
        }
        assert!(store.find_reaction(post.id, user.id).await.unwrap().is_some());

        unreact(&store, post.id, user.id, ReactionType::Spicy).await.unwrap();
        assert!(store.find_reaction(post.id, user.id).await.unwrap().is_none());
        assert_eq!(total_reactions(&store, &user).await, 0);
    }

    #[tokio::test]
    async fn test_unreact_without_reaction() {
        let (store, post, user) = seeded().await;
        let err = unreact(&store, post.id, user.id, ReactionType::Hearts)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "reaction_not_found");
    }

    #[tokio::test]
    async fn test_get_reactions_zero_filled() {
        let (store, post, user) = seeded().await;
        let summary = get_reactions(&store, post.id, Some(user.id)).await.unwrap();
        assert_eq!(summary.reactions, ReactionCounts::default());
        assert_eq!(summary.total_reactions, 0);
        assert!(summary.user_reaction.is_none());

        let json = serde_json::to_value(&summary.reactions).unwrap();
        assert_eq!(json, serde_json::json!({"tea": 0, "spicy": 0, "cap": 0, "hearts": 0}));
    }

    #[tokio::test]
    async fn test_get_reactions_reports_user_reaction() {
        let (store, post, user) = seeded().await;
        react(&store, post.id, user.id, ReactionType::Hearts, Utc::now()).await.unwrap();
        let summary = get_reactions(&store, post.id, Some(user.id)).await.unwrap();
        assert_eq!(summary.reactions.hearts, 1);
        assert_eq!(summary.total_reactions, 1);
        assert_eq!(
            summary.user_reaction.map(|r| r.reaction_type),
            Some(ReactionType::Hearts)
        );
        assert_eq!(summary.user_reactions[0].user.as_ref().unwrap().name, "Reactor");
    }
}
