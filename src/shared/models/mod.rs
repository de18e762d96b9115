//! Entity definitions
//!
//! One module per stored collection. Identifiers are UUIDs, timestamps are
//! UTC, and counters are signed so that best-effort decrements can be
//! clamped rather than wrapping.

pub mod badge;
pub mod comment;
pub mod post;
pub mod reaction;
pub mod room;
pub mod user;

pub use badge::{Badge, BadgeRequirements, Rarity, UserBadge};
pub use comment::Comment;
pub use post::{Post, PostDuration};
pub use reaction::{Reaction, ReactionType};
pub use room::Room;
pub use user::User;
