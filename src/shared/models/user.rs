//! User Data Structure
//!
//! A registered account plus its display pseudonym and the denormalized
//! activity counters maintained by post and reaction side effects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Login email, unique and stored lower-cased
    pub email: String,
    /// bcrypt hash of the password, never serialized
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// Display pseudonym, immutable once assigned
    pub alias: Option<String>,
    /// Public pseudonymous identifier, unique when present
    pub anonymous_id: Option<String>,
    /// Number of posts authored (best-effort counter)
    pub total_posts: i64,
    /// Number of reactions given (best-effort counter)
    pub total_reactions: i64,
    /// Last time the user did anything
    pub last_active_at: DateTime<Utc>,
    /// Account creation time
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Build a fresh account with zeroed counters
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            alias: None,
            anonymous_id: None,
            total_posts: 0,
            total_reactions: 0,
            last_active_at: now,
            created_at: now,
        }
    }

    /// Whether both pseudonym fields are already set
    pub fn has_identity(&self) -> bool {
        self.alias.is_some() && self.anonymous_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User::new("Ada", "ada@example.com", "$2b$04$secret", Utc::now());
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["email"], "ada@example.com");
        assert_eq!(json["totalPosts"], 0);
    }

    #[test]
    fn test_new_user_has_no_identity() {
        let user = User::new("Ada", "ada@example.com", "hash", Utc::now());
        assert!(!user.has_identity());
    }
}
