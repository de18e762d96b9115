/**
 * Error Conversion
 *
 * Converts backend errors into HTTP responses and maps axum's extractor
 * rejections into the same taxonomy.
 *
 * # Response Format
 *
 * ```json
 * {
 *   "error": "post_not_found",
 *   "status": 404
 * }
 * ```
 *
 * A type mismatch additionally carries `currentType` and `requestedType`.
 */

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::backend::error::types::BackendError;

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        match &self {
            Self::Internal { message } => {
                tracing::error!("Internal error: {}", message);
            }
            _ => {
                tracing::debug!("Request failed with {}: {}", status.as_u16(), code);
            }
        }

        let body = match &self {
            Self::TypeMismatch { current, requested } => json!({
                "error": code,
                "status": status.as_u16(),
                "currentType": current.as_str(),
                "requestedType": requested.as_str(),
            }),
            _ => json!({
                "error": code,
                "status": status.as_u16(),
            }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for BackendError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::warn!("Rejected JSON body: {}", rejection.body_text());
        Self::validation("invalid_body")
    }
}

impl From<QueryRejection> for BackendError {
    fn from(rejection: QueryRejection) -> Self {
        tracing::warn!("Rejected query string: {}", rejection.body_text());
        Self::validation("invalid_query")
    }
}

impl From<PathRejection> for BackendError {
    fn from(rejection: PathRejection) -> Self {
        tracing::warn!("Rejected path parameters: {}", rejection.body_text());
        Self::validation("invalid_path")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::ReactionType;
    use axum::http::StatusCode;

    #[test]
    fn test_into_response_status() {
        let response = BackendError::not_found("post_not_found").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_internal_response_status() {
        let response = BackendError::internal("pool exhausted").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_type_mismatch_response_status() {
        let response = BackendError::TypeMismatch {
            current: ReactionType::Spicy,
            requested: ReactionType::Tea,
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
