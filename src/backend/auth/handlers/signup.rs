/**
 * Signup Handler
 *
 * POST /users
 *
 * # Registration Process
 *
 * 1. Require name, email and password
 * 2. Normalize the email (trimmed, lower-cased) and validate its format
 * 3. Hash the password with bcrypt
 * 4. Generate the user's alias and anonymous id
 * 5. Insert; the unique email index reports duplicates
 * 6. Return the profile and a session token
 */

use axum::{extract::State, http::StatusCode, response::Json};
use chrono::Utc;
use validator::ValidateEmail;

use crate::backend::auth::handlers::types::{SignupRequest, SignupResponse};
use crate::backend::auth::identity::Identity;
use crate::backend::auth::password::hash_password;
use crate::backend::auth::sessions::create_token;
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::extract::{present, ApiJson};
use crate::backend::server::state::AppState;
use crate::backend::store::constraints;
use crate::shared::User;

/// Identity collisions tolerated before giving up
const IDENTITY_ATTEMPTS: usize = 3;

/// Trimmed, lower-cased email
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Sign up handler
///
/// # Errors
///
/// * `400 name_email_and_password_required` - a field is missing or blank
/// * `400 invalid_email` - the email is malformed
/// * `409 email_already_exists` - the email is taken
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SignupRequest>,
) -> BackendResult<(StatusCode, Json<SignupResponse>)> {
    let (name, email, password) = match (
        present(request.name),
        present(request.email),
        request.password.filter(|p| !p.is_empty()),
    ) {
        (Some(name), Some(email), Some(password)) => (name, email, password),
        _ => {
            tracing::warn!("Signup rejected: missing required fields");
            return Err(BackendError::validation("name_email_and_password_required"));
        }
    };

    let email = normalize_email(&email);
    if !email.validate_email() {
        tracing::warn!("Signup rejected: invalid email format: {}", email);
        return Err(BackendError::validation("invalid_email"));
    }

    let password_hash = hash_password(password, state.config.bcrypt_cost).await?;

    let mut attempt = 0;
    let user = loop {
        attempt += 1;
        let identity = Identity::generate();
        let mut user = User::new(name.clone(), email.clone(), password_hash.clone(), Utc::now());
        user.alias = Some(identity.alias);
        user.anonymous_id = Some(identity.anonymous_id);

        match state.store.insert_user(&user).await {
            Ok(()) => break user,
            Err(e) if e.violates(constraints::USER_EMAIL) => {
                tracing::warn!("Signup rejected: email already exists: {}", email);
                return Err(BackendError::conflict("email_already_exists"));
            }
            Err(e) if e.violates(constraints::USER_ANONYMOUS_ID) && attempt < IDENTITY_ATTEMPTS => {
                tracing::debug!("Anonymous id collision on signup, regenerating");
            }
            Err(e) => return Err(e.into()),
        }
    };

    let token = create_token(user.id, user.email.clone(), &state.config.jwt_secret)
        .map_err(|e| BackendError::internal(format!("failed to create token: {}", e)))?;

    tracing::info!("User created successfully: {} ({})", user.id, user.email);

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            id: user.id,
            name: user.name,
            email: user.email,
            alias: user.alias,
            anonymous_id: user.anonymous_id,
            token,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ada@Example.COM "), "ada@example.com");
    }

    #[test]
    fn test_email_validation() {
        assert!("ada@example.com".validate_email());
        assert!(!"not-an-email".validate_email());
    }
}
