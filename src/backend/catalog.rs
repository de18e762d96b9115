//! Default room and badge catalog
//!
//! Seeding is insert-if-absent keyed on the unique name, so running it on
//! every startup leaves existing rows (and any edits to them) untouched.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::backend::store::{constraints, Store, StoreResult};
use crate::shared::{Badge, BadgeRequirements, Rarity, Room};

struct RoomSeed {
    name: &'static str,
    description: &'static str,
    icon: &'static str,
    gradient: &'static str,
    is_trending: bool,
    member_count: i64,
    /// Minutes since last activity at seeding time
    idle_minutes: i64,
}

const ROOMS: &[RoomSeed] = &[
    RoomSeed {
        name: "Celeb Gossip",
        description: "Latest celebrity drama, scandals, and tea from Hollywood and beyond",
        icon: "🌟",
        gradient: "gradient-primary",
        is_trending: true,
        member_count: 12547,
        idle_minutes: 2,
    },
    RoomSeed {
        name: "Movies",
        description: "Honest reviews, hot takes, and discussions about the latest films",
        icon: "🎬",
        gradient: "gradient-accent",
        is_trending: true,
        member_count: 8934,
        idle_minutes: 5,
    },
    RoomSeed {
        name: "Gaming",
        description: "Game reviews, industry news, and gaming community drama",
        icon: "🎮",
        gradient: "gradient-warm",
        is_trending: true,
        member_count: 15623,
        idle_minutes: 1,
    },
    RoomSeed {
        name: "Campus Tea",
        description: "University drama, professor gossip, and student life stories",
        icon: "🏫",
        gradient: "gradient-primary",
        is_trending: false,
        member_count: 6789,
        idle_minutes: 8,
    },
    RoomSeed {
        name: "Memes",
        description: "Viral content, internet culture, and meme reviews",
        icon: "😂",
        gradient: "gradient-accent",
        is_trending: false,
        member_count: 9876,
        idle_minutes: 3,
    },
    RoomSeed {
        name: "Music",
        description: "Artist drama, album reviews, and music industry tea",
        icon: "🎵",
        gradient: "gradient-warm",
        is_trending: false,
        member_count: 5432,
        idle_minutes: 12,
    },
    RoomSeed {
        name: "Fashion",
        description: "Style fails, designer drama, and fashion week gossip",
        icon: "👗",
        gradient: "gradient-primary",
        is_trending: false,
        member_count: 4321,
        idle_minutes: 15,
    },
    RoomSeed {
        name: "Tech",
        description: "Silicon Valley drama, startup fails, and tech industry tea",
        icon: "💻",
        gradient: "gradient-accent",
        is_trending: false,
        member_count: 7890,
        idle_minutes: 6,
    },
];

struct BadgeSeed {
    name: &'static str,
    description: &'static str,
    icon: &'static str,
    rarity: Rarity,
    posts_required: Option<i64>,
    reactions_required: Option<i64>,
    days_active: Option<i64>,
    category: Option<&'static str>,
}

const BADGES: &[BadgeSeed] = &[
    BadgeSeed {
        name: "Tea Connoisseur",
        description: "Spilled 50+ posts that got major reactions",
        icon: "☕",
        rarity: Rarity::Rare,
        posts_required: Some(50),
        reactions_required: Some(1000),
        days_active: None,
        category: None,
    },
    BadgeSeed {
        name: "Gossip Guru",
        description: "Master of celebrity drama and hot takes",
        icon: "👑",
        rarity: Rarity::Legendary,
        posts_required: Some(100),
        reactions_required: Some(5000),
        days_active: None,
        category: Some("Celeb Gossip"),
    },
    BadgeSeed {
        name: "Movie Buff",
        description: "Expert reviewer in Movies room",
        icon: "🎬",
        rarity: Rarity::Common,
        posts_required: Some(25),
        reactions_required: None,
        days_active: None,
        category: Some("Movies"),
    },
    BadgeSeed {
        name: "Anonymous Legend",
        description: "Been active for 100+ days",
        icon: "👻",
        rarity: Rarity::Legendary,
        posts_required: None,
        reactions_required: None,
        days_active: Some(100),
        category: None,
    },
    BadgeSeed {
        name: "Gaming Guru",
        description: "Top contributor in Gaming room",
        icon: "🎮",
        rarity: Rarity::Rare,
        posts_required: Some(75),
        reactions_required: None,
        days_active: None,
        category: Some("Gaming"),
    },
    BadgeSeed {
        name: "Campus Insider",
        description: "University drama expert",
        icon: "🏫",
        rarity: Rarity::Common,
        posts_required: Some(30),
        reactions_required: None,
        days_active: None,
        category: Some("Campus Tea"),
    },
];

/// Rows inserted by one seeding run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub rooms: usize,
    pub badges: usize,
}

impl RoomSeed {
    fn build(&self, now: DateTime<Utc>) -> Room {
        let mut room = Room::new(
            self.name,
            self.description,
            Some(self.icon.to_string()),
            Some(self.gradient.to_string()),
            now,
        );
        room.is_trending = self.is_trending;
        room.member_count = self.member_count;
        room.last_activity = now - Duration::minutes(self.idle_minutes);
        room
    }
}

impl BadgeSeed {
    fn build(&self, now: DateTime<Utc>) -> Badge {
        Badge {
            id: Uuid::new_v4(),
            name: self.name.to_string(),
            description: self.description.to_string(),
            icon: self.icon.to_string(),
            rarity: self.rarity,
            requirements: BadgeRequirements {
                posts_required: self.posts_required,
                reactions_required: self.reactions_required,
                days_active: self.days_active,
                category: self.category.map(str::to_string),
            },
            is_active: true,
            created_at: now,
        }
    }
}

/// Insert every catalog room and badge that is not already present
///
/// A name collision means the row exists and is skipped. Any other store
/// failure aborts the run.
pub async fn seed_catalog(store: &dyn Store, now: DateTime<Utc>) -> StoreResult<SeedReport> {
    let mut report = SeedReport::default();

    for seed in ROOMS {
        match store.insert_room(&seed.build(now)).await {
            Ok(()) => report.rooms += 1,
            Err(e) if e.violates(constraints::ROOM_NAME) => {
                tracing::debug!("Room {} already seeded", seed.name);
            }
            Err(e) => return Err(e),
        }
    }

    for seed in BADGES {
        match store.insert_badge(&seed.build(now)).await {
            Ok(()) => report.badges += 1,
            Err(e) if e.violates(constraints::BADGE_NAME) => {
                tracing::debug!("Badge {} already seeded", seed.name);
            }
            Err(e) => return Err(e),
        }
    }

    tracing::info!(
        "Catalog seeded: {} new rooms, {} new badges",
        report.rooms,
        report.badges
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::store::{BadgeStore, MemoryStore, RoomStore};

    #[tokio::test]
    async fn test_seed_catalog_is_idempotent() {
        let store = MemoryStore::new();
        let first = seed_catalog(&store, Utc::now()).await.unwrap();
        assert_eq!(first, SeedReport { rooms: 8, badges: 6 });

        let second = seed_catalog(&store, Utc::now()).await.unwrap();
        assert_eq!(second, SeedReport::default());
        assert_eq!(store.list_rooms(false).await.unwrap().len(), 8);
        assert_eq!(store.list_active_badges().await.unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_seeded_trending_rooms() {
        let store = MemoryStore::new();
        seed_catalog(&store, Utc::now()).await.unwrap();
        let trending: Vec<String> = store
            .list_rooms(true)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(trending, vec!["Gaming", "Celeb Gossip", "Movies"]);
    }
}
