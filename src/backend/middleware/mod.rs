//! Middleware Module
//!
//! HTTP middleware for the backend server.
//!
//! - **`session_tracker`** - bounded per-client action log for diagnostics

pub mod session_tracker;

pub use session_tracker::{track_session, SessionStats, SessionTracker};
