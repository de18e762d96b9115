//! Post Data Structure
//!
//! Posts are ephemeral by default. The lifetime a client asks for is
//! recorded in `duration`; `expires_at` is the instant that actually
//! governs visibility and removal.

use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::SharedError;

/// Category assigned when a post is created without one
pub const DEFAULT_CATEGORY: &str = "General";

/// Requested lifetime of a post
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PostDuration {
    /// Expires 24 hours after creation
    #[serde(rename = "24h")]
    Day,
    /// Expires 7 days after creation
    #[serde(rename = "7d")]
    Week,
    /// Never expires
    #[serde(rename = "permanent")]
    Permanent,
}

impl FromStr for PostDuration {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "24h" => Ok(PostDuration::Day),
            "7d" => Ok(PostDuration::Week),
            "permanent" => Ok(PostDuration::Permanent),
            _ => Err(SharedError::invalid_value("duration", s)),
        }
    }
}

impl Default for PostDuration {
    fn default() -> Self {
        PostDuration::Day
    }
}

impl PostDuration {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostDuration::Day => "24h",
            PostDuration::Week => "7d",
            PostDuration::Permanent => "permanent",
        }
    }

    /// The fixed window this duration stands for, `None` for permanent
    pub fn window(&self) -> Option<Duration> {
        match self {
            PostDuration::Day => Some(Duration::hours(24)),
            PostDuration::Week => Some(Duration::days(7)),
            PostDuration::Permanent => None,
        }
    }
}

/// A post in a room
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Unique post ID
    pub id: Uuid,
    pub title: String,
    pub content: String,
    /// Author user ID
    pub author_id: Uuid,
    /// Owning room ID
    pub room_id: Uuid,
    pub category: String,
    /// Effective lifetime after policy was applied
    pub duration: PostDuration,
    pub is_voice_note: bool,
    /// Expiry instant, `None` means the post never expires
    pub expires_at: Option<DateTime<Utc>>,
    /// Soft marker set by the sweep before removal
    pub is_expired: bool,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Whether the post is still visible at `now`
    ///
    /// `expires_at` is authoritative; the soft marker only ever hides
    /// posts earlier, never later.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        if self.is_expired {
            return false;
        }
        match self.expires_at {
            Some(expires_at) => expires_at > now,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(expires_at: Option<DateTime<Utc>>) -> Post {
        let now = Utc::now();
        Post {
            id: Uuid::new_v4(),
            title: "t".into(),
            content: "c".into(),
            author_id: Uuid::new_v4(),
            room_id: Uuid::new_v4(),
            category: DEFAULT_CATEGORY.into(),
            duration: PostDuration::Day,
            is_voice_note: false,
            expires_at,
            is_expired: false,
            created_at: now,
        }
    }

    #[test]
    fn test_duration_parsing() {
        assert_eq!("24h".parse::<PostDuration>().ok(), Some(PostDuration::Day));
        assert_eq!(" 7D".parse::<PostDuration>().ok(), Some(PostDuration::Week));
        assert_eq!("permanent".parse::<PostDuration>().ok(), Some(PostDuration::Permanent));
        let err = "3d".parse::<PostDuration>().unwrap_err();
        assert_eq!(err.field(), "duration");
    }

    #[test]
    fn test_duration_serde_names() {
        let json = serde_json::to_string(&PostDuration::Week).unwrap();
        assert_eq!(json, "\"7d\"");
        let parsed: PostDuration = serde_json::from_str("\"permanent\"").unwrap();
        assert_eq!(parsed, PostDuration::Permanent);
    }

    #[test]
    fn test_is_live_boundary() {
        let now = Utc::now();
        assert!(sample(None).is_live(now));
        assert!(sample(Some(now + Duration::seconds(1))).is_live(now));
        assert!(!sample(Some(now)).is_live(now));

        let mut marked = sample(None);
        marked.is_expired = true;
        assert!(!marked.is_live(now));
    }
}
