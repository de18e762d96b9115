//! Server Module
//!
//! Startup and shared state for the HTTP server.
//!
//! - **`config`** - configuration loading and store selection
//! - **`state`** - `AppState` and its `FromRef` projections
//! - **`init`** - builds the router and starts background jobs

pub mod config;
pub mod init;
pub mod state;

pub use config::{AppConfig, ConfigError};
pub use init::{build_app, create_app};
pub use state::AppState;
