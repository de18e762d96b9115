//! Request extraction helpers
//!
//! `ApiJson` and `ApiQuery` wrap axum's extractors so that malformed input
//! is reported through `BackendError` rather than axum's plain-text
//! rejections. The rest of this module turns loosely-typed request fields
//! into domain values.

use axum::extract::{FromRequest, FromRequestParts};
use axum::http::HeaderMap;
use uuid::Uuid;

use crate::backend::auth::sessions;
use crate::backend::error::{BackendError, BackendResult};

/// JSON body extractor reporting `invalid_body` on failure
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(BackendError))]
pub struct ApiJson<T>(pub T);

/// Query-string extractor reporting `invalid_query` on failure
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(BackendError))]
pub struct ApiQuery<T>(pub T);

/// Header carrying the acting user's id
pub const USER_ID_HEADER: &str = "x-user-id";

/// Trimmed, non-empty value or `None`
pub fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse an id, failing with `invalid_<name>`
pub fn parse_id(raw: &str, name: &str) -> BackendResult<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| {
        tracing::warn!("Rejected malformed {}: {}", name, raw);
        BackendError::validation(format!("invalid_{}", name))
    })
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActorBody {
    user_id: Option<String>,
}

/// `userId` from an optional JSON body; anything unparseable counts as absent
pub fn body_user(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ActorBody>(body)
        .ok()
        .and_then(|b| b.user_id)
}

/// Resolve who is acting on a request
///
/// Sources in priority order: the JSON body `userId`, the `userId` query
/// parameter, the `x-user-id` header, then a `Bearer` session token.
pub fn acting_user(
    body_user: Option<String>,
    query_user: Option<String>,
    headers: &HeaderMap,
    jwt_secret: &str,
) -> Option<String> {
    if let Some(user) = present(body_user) {
        return Some(user);
    }
    if let Some(user) = present(query_user) {
        return Some(user);
    }
    let header_user = headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());
    if let Some(user) = present(header_user) {
        return Some(user);
    }
    let token = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))?;
    match sessions::verify_token(token, jwt_secret) {
        Ok(claims) => Some(claims.sub),
        Err(e) => {
            tracing::warn!("Ignoring invalid session token: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const SECRET: &str = "extract-test-secret";

    #[test]
    fn test_present_trims_and_drops_empty() {
        assert_eq!(present(Some("  abc ".into())), Some("abc".to_string()));
        assert_eq!(present(Some("   ".into())), None);
        assert_eq!(present(None), None);
    }

    #[test]
    fn test_parse_id_error_code() {
        let err = parse_id("not-a-uuid", "post_id").unwrap_err();
        assert_eq!(err.code(), "invalid_post_id");
        assert!(parse_id(&Uuid::new_v4().to_string(), "post_id").is_ok());
    }

    #[test]
    fn test_body_user_tolerates_missing_body() {
        assert_eq!(body_user(br#"{"userId":"u-1"}"#), Some("u-1".to_string()));
        assert_eq!(body_user(b""), None);
        assert_eq!(body_user(b"not json"), None);
    }

    #[test]
    fn test_acting_user_priority() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("from-header"));

        assert_eq!(
            acting_user(Some("from-body".into()), Some("from-query".into()), &headers, SECRET),
            Some("from-body".to_string())
        );
        assert_eq!(
            acting_user(None, Some("from-query".into()), &headers, SECRET),
            Some("from-query".to_string())
        );
        assert_eq!(
            acting_user(None, None, &headers, SECRET),
            Some("from-header".to_string())
        );
    }

    #[test]
    fn test_acting_user_from_bearer_token() {
        let user_id = Uuid::new_v4();
        let token = sessions::create_token(user_id, "a@example.com".into(), SECRET).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );
        assert_eq!(
            acting_user(None, None, &headers, SECRET),
            Some(user_id.to_string())
        );
        assert_eq!(acting_user(None, None, &headers, "other-secret"), None);
    }
}
