//! Shared Module
//!
//! Domain entities and value types used by every backend component: the
//! entity store persists them, the engines operate on them, and the HTTP
//! layer serializes them (camelCase on the wire).

/// Domain entities
pub mod models;

/// Shared error types
pub mod error;

/// Re-export commonly used types for convenience
pub use error::SharedError;
pub use models::{
    Badge, BadgeRequirements, Comment, Post, PostDuration, Rarity, Reaction, ReactionType, Room,
    User, UserBadge,
};
