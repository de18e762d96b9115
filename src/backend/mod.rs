//! Backend Module
//!
//! The HTTP server for the tearoom posting service: users post into topic
//! rooms, react and comment, and earn badges. Posts expire and are swept
//! together with everything that references them.
//!
//! # Architecture
//!
//! - **`server`** - configuration, application state, startup
//! - **`routes`** - endpoint table and middleware stack
//! - **`store`** - Entity Store trait with PostgreSQL and in-memory backends
//! - **`expiration`** - lifetime policy, cascade removal, periodic sweep
//! - **`reactions`** - one reaction per user per post
//! - **`posts`**, **`rooms`**, **`comments`** - content endpoints
//! - **`badges`** - activity statistics and badge awarding
//! - **`auth`** - accounts, pseudonyms, passwords, session tokens
//! - **`catalog`** - default rooms and badges
//! - **`middleware`** - diagnostic session tracking
//! - **`error`** - `BackendError` and its HTTP mapping
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs
//! ├── main.rs        - server binary
//! ├── server/        - config, state, init
//! ├── routes/        - router and endpoint table
//! ├── store/         - Store trait, PgStore, MemoryStore
//! ├── expiration/    - policy, cascade, sweep
//! ├── reactions/     - engine and handlers
//! ├── posts/         - service and handlers
//! ├── rooms/         - handlers
//! ├── comments/      - thread assembly and handlers
//! ├── badges/        - evaluator and handlers
//! ├── auth/          - identity, password, sessions, handlers
//! ├── middleware/    - session tracker
//! ├── error/         - error types and response conversion
//! ├── catalog.rs     - seed data
//! ├── health.rs      - health and diagnostics
//! ├── extract.rs     - request extractors and field helpers
//! └── views.rs       - author and room display projections
//! ```

pub mod auth;
pub mod badges;
pub mod catalog;
pub mod comments;
pub mod error;
pub mod expiration;
pub mod extract;
pub mod health;
pub mod middleware;
pub mod posts;
pub mod reactions;
pub mod rooms;
pub mod routes;
pub mod server;
pub mod store;
pub mod views;
