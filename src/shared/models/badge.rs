//! Badge Data Structures
//!
//! `Badge` is static catalog data; `UserBadge` records that a user earned
//! one. Requirement fields are a conjunction: a field that is absent (or
//! zero) places no constraint.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::SharedError;

/// Rarity tier of a badge
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Rare,
    Legendary,
}

impl Rarity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Rare => "rare",
            Rarity::Legendary => "legendary",
        }
    }
}

impl FromStr for Rarity {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "common" => Ok(Rarity::Common),
            "rare" => Ok(Rarity::Rare),
            "legendary" => Ok(Rarity::Legendary),
            _ => Err(SharedError::invalid_value("rarity", s)),
        }
    }
}

/// Requirement predicate attached to a badge
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BadgeRequirements {
    /// Minimum number of posts
    #[serde(default)]
    pub posts_required: Option<i64>,
    /// Minimum number of reactions received
    #[serde(default)]
    pub reactions_required: Option<i64>,
    /// Minimum number of distinct days with a post
    #[serde(default)]
    pub days_active: Option<i64>,
    /// Category the user must have posted in at least once
    #[serde(default)]
    pub category: Option<String>,
}

/// A catalog badge
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub id: Uuid,
    /// Unique badge name
    pub name: String,
    pub description: String,
    pub icon: String,
    pub rarity: Rarity,
    pub requirements: BadgeRequirements,
    /// Inactive badges are never evaluated
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A badge earned by a user, unique per (user, badge)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserBadge {
    pub id: Uuid,
    pub user_id: Uuid,
    pub badge_id: Uuid,
    pub earned_at: DateTime<Utc>,
}

impl UserBadge {
    pub fn new(user_id: Uuid, badge_id: Uuid, earned_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            badge_id,
            earned_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requirements_deserialize_partial() {
        let reqs: BadgeRequirements =
            serde_json::from_str(r#"{"postsRequired":25,"category":"Movies"}"#).unwrap();
        assert_eq!(reqs.posts_required, Some(25));
        assert_eq!(reqs.reactions_required, None);
        assert_eq!(reqs.category.as_deref(), Some("Movies"));
    }

    #[test]
    fn test_rarity_parsing() {
        assert_eq!("Legendary".parse::<Rarity>().ok(), Some(Rarity::Legendary));
        assert!("epic".parse::<Rarity>().is_err());
    }
}
