//! Expiration Engine
//!
//! Posts move through `Active -> Expired -> Removed`.
//!
//! - **Active -> Expired** is implicit: a post is expired once its
//!   `expires_at` is at or before now. Listing queries filter on that
//!   instant, so an expired post disappears immediately even if no sweep
//!   has run yet.
//! - **Expired -> Removed** happens in the periodic sweep, or earlier when
//!   the author deletes the post. Both paths share `cascade::remove_post`.
//!
//! # Module Structure
//!
//! ```text
//! expiration/
//! ├── mod.rs     - Module exports and documentation
//! ├── policy.rs  - Lifetime assignment at creation
//! ├── cascade.rs - Removal of a post and everything that references it
//! └── sweep.rs   - Periodic sweep and startup backfill
//! ```

/// Lifetime assignment
pub mod policy;

/// Post removal cascade
pub mod cascade;

/// Sweep job
pub mod sweep;

pub use cascade::{remove_post, CascadeSummary};
pub use policy::ExpirationPolicy;
pub use sweep::{backfill_missing_expiry, run_sweep, spawn_sweeper, SweepReport};
