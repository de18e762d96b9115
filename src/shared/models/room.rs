//! Room Data Structure

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Icon used when a room is created without one
pub const DEFAULT_ROOM_ICON: &str = "🏠";

/// Gradient used when a room is created without one
pub const DEFAULT_ROOM_GRADIENT: &str = "bg-gradient-to-br from-blue-500 to-purple-600";

/// A named topic channel that posts belong to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    /// Unique room ID
    pub id: Uuid,
    /// Room name, unique across rooms
    pub name: String,
    /// Short description shown in listings
    pub description: String,
    /// Display icon
    pub icon: String,
    /// CSS gradient class string
    pub gradient: String,
    /// Optional grouping category
    pub category: Option<String>,
    /// Whether the room is flagged as trending
    pub is_trending: bool,
    /// Member count, always 0 for rooms created through the API
    pub member_count: i64,
    /// Live post counter (best-effort)
    pub recent_post_count: i64,
    /// Time of the last post in the room
    pub last_activity: DateTime<Utc>,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl Room {
    /// Build a room with zeroed counters, filling in display defaults
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        icon: Option<String>,
        gradient: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            icon: icon
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_ROOM_ICON.to_string()),
            gradient: gradient
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_ROOM_GRADIENT.to_string()),
            category: None,
            is_trending: false,
            member_count: 0,
            recent_post_count: 0,
            last_activity: now,
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_defaults() {
        let room = Room::new("Gaming", "Games", None, Some("  ".to_string()), Utc::now());
        assert_eq!(room.icon, DEFAULT_ROOM_ICON);
        assert_eq!(room.gradient, DEFAULT_ROOM_GRADIENT);
        assert_eq!(room.member_count, 0);
        assert!(!room.is_trending);
    }
}
