//! Reaction Data Structure

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::SharedError;

/// The closed set of reaction kinds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ReactionType {
    Tea,
    Spicy,
    Cap,
    Hearts,
}

impl ReactionType {
    /// Every reaction type, in display order
    pub const ALL: [ReactionType; 4] = [
        ReactionType::Tea,
        ReactionType::Spicy,
        ReactionType::Cap,
        ReactionType::Hearts,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReactionType::Tea => "tea",
            ReactionType::Spicy => "spicy",
            ReactionType::Cap => "cap",
            ReactionType::Hearts => "hearts",
        }
    }
}

/// Case-sensitive: the wire values are lower-case only
impl FromStr for ReactionType {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tea" => Ok(ReactionType::Tea),
            "spicy" => Ok(ReactionType::Spicy),
            "cap" => Ok(ReactionType::Cap),
            "hearts" => Ok(ReactionType::Hearts),
            _ => Err(SharedError::invalid_value("reactionType", s)),
        }
    }
}

/// A single user's reaction to a post, at most one per (post, user)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Reaction {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub reaction_type: ReactionType,
    pub created_at: DateTime<Utc>,
    /// Bumped when the type is switched in place
    pub updated_at: DateTime<Utc>,
}

impl Reaction {
    pub fn new(post_id: Uuid, user_id: Uuid, reaction_type: ReactionType, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            post_id,
            user_id,
            reaction_type,
            created_at: now,
            updated_at: now,
        }
    }
}
