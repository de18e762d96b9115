//! Reaction Engine
//!
//! A user holds at most one reaction per post. Reacting again with the
//! same type is a no-op; reacting with a different type switches the
//! stored reaction in place. Only creation and removal move the user's
//! `total_reactions` counter.
//!
//! - **`engine`** - React, Unreact and GetReactions over the store
//! - **`handlers`** - `/reactions` endpoints, including the demo identity

pub mod engine;
pub mod handlers;

pub use engine::{get_reactions, react, unreact, ReactOutcome, ReactionCounts, ReactionSummary};
pub use handlers::{add_reaction, list_reactions, remove_reaction};
