//! Badge Evaluator
//!
//! Derives activity statistics from a user's posts and matches them
//! against the requirement predicates of the active badge catalog.
//!
//! - **`evaluator`** - ComputeUserStats, EvaluateRequirements, CheckAndAward
//! - **`handlers`** - `/badges` endpoints and `/users/{id}/stats`

pub mod evaluator;
pub mod handlers;

pub use evaluator::{check_and_award, compute_user_stats, meets_requirements, AwardedBadge, UserStats};
pub use handlers::{check_badges, list_badges, user_stats};
