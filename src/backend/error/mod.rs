//! Backend Error Module
//!
//! Error types returned by HTTP handlers and the engines behind them.
//!
//! # Module Structure
//!
//! ```text
//! error/
//! ├── mod.rs        - Module exports and documentation
//! ├── types.rs      - Error type definitions
//! └── conversion.rs - IntoResponse and From implementations
//! ```
//!
//! # Error Taxonomy
//!
//! | Variant        | Status | Example code                  |
//! |----------------|--------|-------------------------------|
//! | `Validation`   | 400    | `invalid_reaction_type`       |
//! | `TypeMismatch` | 400    | `type_mismatch`               |
//! | `Unauthorized` | 401    | `invalid_credentials`         |
//! | `Forbidden`    | 403    | `not_owner`                   |
//! | `NotFound`     | 404    | `post_not_found`              |
//! | `Conflict`     | 409    | `email_already_exists`        |
//! | `Internal`     | 500    | `internal_error`              |
//!
//! Every response body is a flat JSON object with an `error` code and the
//! numeric `status`. Internal details are logged, never sent. A store that
//! cannot be reached surfaces as `Internal` like any other store failure.

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

// Re-export commonly used types
pub use types::BackendError;

/// Result alias used by handlers and engines
pub type BackendResult<T> = Result<T, BackendError>;
