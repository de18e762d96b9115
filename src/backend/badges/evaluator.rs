/**
 * Badge evaluation
 *
 * Statistics are recomputed from the posts table on every call instead of
 * read from the denormalized user counters, so a drifted counter never
 * awards or withholds a badge.
 *
 * # Awarding
 *
 * `check_and_award` may race with itself for the same user. The unique
 * (user, badge) index settles the race: the losing insert reports a
 * constraint violation, which is skipped, and the badge is reported as new
 * only by the call that stored it.
 */

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::backend::error::{BackendError, BackendResult};
use crate::backend::store::{constraints, Store};
use crate::shared::models::post::DEFAULT_CATEGORY;
use crate::shared::{Badge, Post, Rarity, User, UserBadge};

/// Activity statistics for one user
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_posts: i64,
    /// Reactions received across all of the user's posts
    pub total_reactions: i64,
    pub days_since_joined: i64,
    /// Distinct UTC calendar days with at least one post
    pub days_active: i64,
    pub category_stats: BTreeMap<String, i64>,
    pub top_category: String,
}

impl UserStats {
    pub fn from_activity(
        user: &User,
        posts: &[Post],
        reactions_received: i64,
        now: DateTime<Utc>,
    ) -> Self {
        let mut ordered: Vec<&Post> = posts.iter().collect();
        ordered.sort_by_key(|p| p.created_at);

        // (category, count) in first-seen order
        let mut categories: Vec<(String, i64)> = Vec::new();
        let mut days: HashSet<NaiveDate> = HashSet::new();
        for post in &ordered {
            days.insert(post.created_at.date_naive());
            match categories.iter_mut().find(|(name, _)| *name == post.category) {
                Some((_, count)) => *count += 1,
                None => categories.push((post.category.clone(), 1)),
            }
        }

        let mut top_category = DEFAULT_CATEGORY.to_string();
        let mut top_count = 0;
        for (name, count) in &categories {
            if *count > top_count {
                top_category = name.clone();
                top_count = *count;
            }
        }

        Self {
            total_posts: posts.len() as i64,
            total_reactions: reactions_received,
            days_since_joined: (now - user.created_at).num_days().max(0),
            days_active: days.len() as i64,
            category_stats: categories.into_iter().collect(),
            top_category,
        }
    }

    fn posts_in(&self, category: &str) -> i64 {
        self.category_stats.get(category).copied().unwrap_or(0)
    }
}

/// Whether `stats` satisfies every present requirement of `badge`
pub fn meets_requirements(badge: &Badge, stats: &UserStats) -> bool {
    let req = &badge.requirements;
    let at_least = |required: Option<i64>, actual: i64| match required {
        Some(min) if min > 0 => actual >= min,
        _ => true,
    };

    at_least(req.posts_required, stats.total_posts)
        && at_least(req.reactions_required, stats.total_reactions)
        && at_least(req.days_active, stats.days_active)
        && req
            .category
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .map_or(true, |c| stats.posts_in(c) >= 1)
}

async fn load_user(store: &dyn Store, user_id: Uuid) -> BackendResult<User> {
    store.find_user(user_id).await?.ok_or_else(|| {
        tracing::warn!("Badge lookup for unknown user {}", user_id);
        BackendError::not_found("user_not_found")
    })
}

/// ComputeUserStats
pub async fn compute_user_stats(
    store: &dyn Store,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> BackendResult<UserStats> {
    let user = load_user(store, user_id).await?;
    let posts = store.list_posts_by_author(user_id).await?;
    let post_ids: Vec<Uuid> = posts.iter().map(|p| p.id).collect();
    let reactions = store.count_reactions_on_posts(&post_ids).await?;
    Ok(UserStats::from_activity(&user, &posts, reactions, now))
}

/// A badge awarded by `check_and_award`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AwardedBadge {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub rarity: Rarity,
    pub earned_at: DateTime<Utc>,
}

/// CheckAndAward
pub async fn check_and_award(
    store: &dyn Store,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> BackendResult<Vec<AwardedBadge>> {
    let stats = compute_user_stats(store, user_id, now).await?;
    let badges = store.list_active_badges().await?;
    let earned: HashSet<Uuid> = store
        .list_user_badges(user_id)
        .await?
        .into_iter()
        .map(|ub| ub.badge_id)
        .collect();

    let mut awarded = Vec::new();
    for badge in badges {
        if earned.contains(&badge.id) || !meets_requirements(&badge, &stats) {
            continue;
        }
        let record = UserBadge::new(user_id, badge.id, now);
        match store.insert_user_badge(&record).await {
            Ok(()) => {
                tracing::info!("Badge {} awarded to {}", badge.name, user_id);
                awarded.push(AwardedBadge {
                    id: badge.id,
                    name: badge.name,
                    description: badge.description,
                    icon: badge.icon,
                    rarity: badge.rarity,
                    earned_at: record.earned_at,
                });
            }
            Err(e) if e.violates(constraints::USER_BADGE_PAIR) => {
                tracing::debug!("Badge {} already awarded to {}", badge.name, user_id);
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(awarded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::store::{BadgeStore, MemoryStore, PostStore, ReactionStore, UserStore};
    use crate::shared::{BadgeRequirements, PostDuration, Reaction, ReactionType};
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(&format!("2025-06-{:02}T{:02}:00:00Z", day, hour))
            .unwrap()
            .with_timezone(&Utc)
    }

    fn post(author: &User, category: &str, created_at: DateTime<Utc>) -> Post {
        Post {
            id: Uuid::new_v4(),
            title: "t".into(),
            content: "c".into(),
            author_id: author.id,
            room_id: Uuid::new_v4(),
            category: category.into(),
            duration: PostDuration::Permanent,
            is_voice_note: false,
            expires_at: None,
            is_expired: false,
            created_at,
        }
    }

    fn badge(name: &str, requirements: BadgeRequirements) -> Badge {
        Badge {
            id: Uuid::new_v4(),
            name: name.into(),
            description: "d".into(),
            icon: "🏅".into(),
            rarity: Rarity::Common,
            requirements,
            is_active: true,
            created_at: at(1, 0),
        }
    }

    #[test]
    fn test_stats_without_posts() {
        let user = User::new("U", "u@example.com", "h", at(1, 0));
        let stats = UserStats::from_activity(&user, &[], 0, at(11, 0));
        assert_eq!(stats.total_posts, 0);
        assert_eq!(stats.days_active, 0);
        assert_eq!(stats.days_since_joined, 10);
        assert_eq!(stats.top_category, "General");
    }

    #[test]
    fn test_stats_categories_and_active_days() {
        let user = User::new("U", "u@example.com", "h", at(1, 0));
        let posts = vec![
            post(&user, "Movies", at(2, 9)),
            post(&user, "Gaming", at(2, 20)),
            post(&user, "Gaming", at(4, 8)),
        ];
        let stats = UserStats::from_activity(&user, &posts, 7, at(5, 0));
        assert_eq!(stats.total_posts, 3);
        assert_eq!(stats.total_reactions, 7);
        assert_eq!(stats.days_active, 2);
        assert_eq!(stats.category_stats.get("Gaming"), Some(&2));
        assert_eq!(stats.top_category, "Gaming");
    }

    #[test]
    fn test_top_category_tie_goes_to_first_seen() {
        let user = User::new("U", "u@example.com", "h", at(1, 0));
        let posts = vec![
            post(&user, "Tech", at(3, 0)),
            post(&user, "Music", at(2, 0)),
        ];
        let stats = UserStats::from_activity(&user, &posts, 0, at(5, 0));
        assert_eq!(stats.top_category, "Music");
    }

    #[test]
    fn test_requirements_absent_or_zero_pass() {
        let user = User::new("U", "u@example.com", "h", at(1, 0));
        let stats = UserStats::from_activity(&user, &[], 0, at(2, 0));
        let open = badge("Open", BadgeRequirements {
            posts_required: Some(0),
            ..Default::default()
        });
        assert!(meets_requirements(&open, &stats));

        let hard = badge("Hard", BadgeRequirements {
            posts_required: Some(1),
            ..Default::default()
        });
        assert!(!meets_requirements(&hard, &stats));
    }

    #[test]
    fn test_category_requirement_needs_one_post() {
        let user = User::new("U", "u@example.com", "h", at(1, 0));
        let movie_buff = badge("Movie Buff", BadgeRequirements {
            category: Some("Movies".into()),
            ..Default::default()
        });
        let none = UserStats::from_activity(&user, &[post(&user, "Tech", at(2, 0))], 0, at(3, 0));
        assert!(!meets_requirements(&movie_buff, &none));
        let one = UserStats::from_activity(&user, &[post(&user, "Movies", at(2, 0))], 0, at(3, 0));
        assert!(meets_requirements(&movie_buff, &one));
    }

    #[tokio::test]
    async fn test_check_and_award_once() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let author = User::new("Author", "author@example.com", "h", now - Duration::days(3));
        let fan = User::new("Fan", "fan@example.com", "h", now);
        store.insert_user(&author).await.unwrap();
        store.insert_user(&fan).await.unwrap();

        let target = badge("Tea Connoisseur", BadgeRequirements {
            posts_required: Some(2),
            reactions_required: Some(2),
            ..Default::default()
        });
        store.insert_badge(&target).await.unwrap();

        for _ in 0..2 {
            let p = post(&author, "General", now);
            store.insert_post(&p).await.unwrap();
            let r = Reaction::new(p.id, fan.id, ReactionType::Tea, now);
            store.insert_reaction(&r).await.unwrap();
        }

        let first = check_and_award(&store, author.id, now).await.unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].name, "Tea Connoisseur");

        let second = check_and_award(&store, author.id, now).await.unwrap();
        assert!(second.is_empty());
        assert_eq!(store.list_user_badges(author.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_check_and_award_skips_badge_awarded_concurrently() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let author = User::new("Author", "author@example.com", "h", now - Duration::days(3));
        store.insert_user(&author).await.unwrap();

        let first_post = badge("First Post", BadgeRequirements {
            posts_required: Some(1),
            ..Default::default()
        });
        let regular = badge("Regular", BadgeRequirements {
            days_active: Some(1),
            ..Default::default()
        });
        store.insert_badge(&first_post).await.unwrap();
        store.insert_badge(&regular).await.unwrap();
        store.insert_post(&post(&author, "General", now)).await.unwrap();

        let rival = UserBadge::new(author.id, first_post.id, now - Duration::seconds(1));
        store.award_after_read(rival.clone());

        let awarded = check_and_award(&store, author.id, now).await.unwrap();
        let names: Vec<&str> = awarded.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Regular"]);

        let held = store.list_user_badges(author.id).await.unwrap();
        assert_eq!(held.len(), 2);
        let first_post_rows: Vec<&UserBadge> =
            held.iter().filter(|ub| ub.badge_id == first_post.id).collect();
        assert_eq!(first_post_rows.len(), 1);
        assert_eq!(first_post_rows[0].id, rival.id);
    }

    #[tokio::test]
    async fn test_stats_for_unknown_user() {
        let store = MemoryStore::new();
        let err = compute_user_stats(&store, Uuid::new_v4(), Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "user_not_found");
    }
}
