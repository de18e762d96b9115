//! Shared Error Types
//!
//! Errors raised while parsing or validating domain values. These are
//! independent of HTTP and storage so the model layer can be used from
//! the store, the engines, and the handlers alike.
//!
//! # Usage
//!
//! ```rust
//! use tearoom::shared::error::SharedError;
//!
//! let error = SharedError::invalid_value("reactionType", "gold");
//! ```
use thiserror::Error;

/// Errors produced by the shared model layer
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SharedError {
    /// A string did not name a known enumeration member
    #[error("Invalid value '{value}' for field '{field}'")]
    InvalidValue {
        /// The field being parsed
        field: String,
        /// The rejected input
        value: String,
    },

    /// Data validation error
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },
}

impl SharedError {
    /// Create a new invalid-value error
    pub fn invalid_value(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Name of the offending field
    pub fn field(&self) -> &str {
        match self {
            Self::InvalidValue { field, .. } => field,
            Self::ValidationError { field, .. } => field,
        }
    }
}
