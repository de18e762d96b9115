/**
 * Backend Error Types
 *
 * `BackendError` carries a machine-readable code for every client-facing
 * failure. Domain validation happens before any mutation, so a handler
 * that returns one of the 4xx variants has not changed anything.
 *
 * # Error Categories
 *
 * ## Client Errors
 *
 * - `Validation` - missing or malformed input
 * - `TypeMismatch` - un-react with a type other than the current one
 * - `Unauthorized` - bad credentials or token
 * - `Forbidden` - acting user does not own the resource
 * - `NotFound` - referenced entity is absent
 * - `Conflict` - uniqueness rule rejected the write
 *
 * ## Server Errors
 *
 * - `Internal` - any store failure or other unexpected error; the detail
 *   is only logged
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::backend::store::StoreError;
use crate::shared::{ReactionType, SharedError};

/// Backend-specific error types
#[derive(Debug, Error)]
pub enum BackendError {
    /// Missing or malformed input
    #[error("validation failed: {code}")]
    Validation {
        /// Reason code sent to the client
        code: String,
    },

    /// Requested un-react type differs from the stored reaction type
    #[error("reaction type mismatch: current {current:?}, requested {requested:?}")]
    TypeMismatch {
        current: ReactionType,
        requested: ReactionType,
    },

    /// Authentication failure
    #[error("unauthorized: {code}")]
    Unauthorized { code: String },

    /// Authorization failure
    #[error("forbidden: {code}")]
    Forbidden { code: String },

    /// Referenced entity does not exist
    #[error("not found: {code}")]
    NotFound { code: String },

    /// Write rejected by a uniqueness rule
    #[error("conflict: {code}")]
    Conflict { code: String },

    /// Unexpected failure, detail kept server-side
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl BackendError {
    pub fn validation(code: impl Into<String>) -> Self {
        Self::Validation { code: code.into() }
    }

    pub fn unauthorized(code: impl Into<String>) -> Self {
        Self::Unauthorized { code: code.into() }
    }

    pub fn forbidden(code: impl Into<String>) -> Self {
        Self::Forbidden { code: code.into() }
    }

    pub fn not_found(code: impl Into<String>) -> Self {
        Self::NotFound { code: code.into() }
    }

    pub fn conflict(code: impl Into<String>) -> Self {
        Self::Conflict { code: code.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Map a store failure, turning a violation of `constraint` into a
    /// `Conflict` with `code`
    pub fn from_store_with(err: StoreError, constraint: &str, code: &str) -> Self {
        if err.violates(constraint) {
            Self::conflict(code)
        } else {
            err.into()
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } | Self::TypeMismatch { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The code sent to clients in the `error` field
    pub fn code(&self) -> String {
        match self {
            Self::Validation { code }
            | Self::Unauthorized { code }
            | Self::Forbidden { code }
            | Self::NotFound { code }
            | Self::Conflict { code } => code.clone(),
            Self::TypeMismatch { .. } => "type_mismatch".to_string(),
            Self::Internal { .. } => "internal_error".to_string(),
        }
    }
}

/// `reactionType` becomes `invalid_reaction_type`
fn invalid_code(field: &str) -> String {
    let mut code = String::from("invalid_");
    for ch in field.chars() {
        if ch.is_ascii_uppercase() {
            code.push('_');
            code.push(ch.to_ascii_lowercase());
        } else {
            code.push(ch);
        }
    }
    code
}

impl From<SharedError> for BackendError {
    fn from(err: SharedError) -> Self {
        Self::validation(invalid_code(err.field()))
    }
}

impl From<StoreError> for BackendError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ConstraintViolation { constraint } => {
                tracing::warn!("Unhandled constraint violation: {}", constraint);
                Self::conflict("constraint_violation")
            }
            other => Self::internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::store::constraints;

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(BackendError::validation("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(BackendError::forbidden("x").status_code(), StatusCode::FORBIDDEN);
        assert_eq!(BackendError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(BackendError::conflict("x").status_code(), StatusCode::CONFLICT);
        assert_eq!(
            BackendError::unauthorized("x").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            BackendError::internal("boom").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_type_mismatch_is_bad_request() {
        let err = BackendError::TypeMismatch {
            current: ReactionType::Spicy,
            requested: ReactionType::Tea,
        };
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "type_mismatch");
    }

    #[test]
    fn test_internal_code_is_opaque() {
        let err = BackendError::internal("connection reset by peer");
        assert_eq!(err.code(), "internal_error");
    }

    #[test]
    fn test_from_shared_error() {
        let err: BackendError = SharedError::invalid_value("reactionType", "gold").into();
        assert_eq!(err.code(), "invalid_reaction_type");
        let err: BackendError = SharedError::invalid_value("duration", "3d").into();
        assert_eq!(err.code(), "invalid_duration");
    }

    #[test]
    fn test_from_store_with_named_constraint() {
        let err = BackendError::from_store_with(
            StoreError::constraint(constraints::ROOM_NAME),
            constraints::ROOM_NAME,
            "room_name_taken",
        );
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.code(), "room_name_taken");

        let err = BackendError::from_store_with(
            StoreError::Unavailable("down".into()),
            constraints::ROOM_NAME,
            "room_name_taken",
        );
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), "internal_error");
    }

    #[test]
    fn test_unreachable_store_is_internal_error() {
        let err: BackendError = StoreError::Unavailable("pool timed out".into()).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), "internal_error");
    }
}
