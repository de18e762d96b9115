//! Route Configuration Module
//!
//! # Architecture
//!
//! - **`router`** - mounts the API twice and applies the middleware stack
//! - **`api_routes`** - the endpoint table
//!
//! # Mounting
//!
//! Every endpoint is reachable both at the root (`/posts`) and under the
//! `/api` prefix (`/api/posts`). The two mounts share one handler set and
//! one application state.

/// Main router creation
pub mod router;

/// Endpoint table
pub mod api_routes;

pub use router::create_router;
