//! Tearoom - ephemeral posting backend
//!
//! Users post into topic rooms, react and comment on posts, and earn
//! badges from accumulated activity. Posts carry a lifetime: once it
//! passes they disappear from listings and a periodic sweep removes them
//! along with their reactions and comments.
//!
//! # Module Structure
//!
//! - **`shared`** - domain entities and enumerations
//!   - User, Room, Post, Reaction, Comment, Badge, UserBadge
//!   - value parsing errors
//!
//! - **`backend`** - Axum HTTP server
//!   - Entity Store over PostgreSQL (sqlx) or memory
//!   - Expiration Engine, Reaction Engine, Badge Evaluator
//!   - HTTP surface mounted at `/` and `/api`
//!
//! # Usage
//!
//! ```rust,no_run
//! use tearoom::backend::server::{create_app, AppConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = create_app(AppConfig::load()?).await;
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
pub mod backend;
