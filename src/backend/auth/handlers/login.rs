/**
 * Login Handler
 *
 * POST /users/login
 *
 * # Authentication Process
 *
 * 1. Look up the user by normalized email
 * 2. Verify the password against the stored bcrypt hash
 * 3. Assign an alias and anonymous id if the account has none yet
 * 4. Refresh `last_active_at`
 * 5. Return the profile and a session token
 *
 * An unknown email and a wrong password produce the same
 * `401 invalid_credentials` response.
 */

use axum::{extract::State, response::Json};
use chrono::Utc;

use crate::backend::auth::handlers::signup::normalize_email;
use crate::backend::auth::handlers::types::{LoginRequest, LoginResponse};
use crate::backend::auth::identity::Identity;
use crate::backend::auth::password::verify_password;
use crate::backend::auth::sessions::create_token;
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::extract::{present, ApiJson};
use crate::backend::server::state::AppState;
use crate::backend::store::{constraints, Store, StoreResult, UserCounterDelta};
use crate::shared::User;

const IDENTITY_ATTEMPTS: usize = 3;

async fn ensure_identity(store: &dyn Store, user: User) -> StoreResult<User> {
    if user.has_identity() {
        return Ok(user);
    }
    let mut attempt = 0;
    loop {
        attempt += 1;
        let identity = Identity::generate();
        match store
            .assign_identity_if_absent(user.id, &identity.alias, &identity.anonymous_id)
            .await
        {
            Ok(Some(updated)) => {
                tracing::info!("Assigned identity {} to user {}", identity.anonymous_id, user.id);
                return Ok(updated);
            }
            Ok(None) => return Ok(user),
            Err(e) if e.violates(constraints::USER_ANONYMOUS_ID) && attempt < IDENTITY_ATTEMPTS => {
                tracing::debug!("Anonymous id collision on login, regenerating");
            }
            Err(e) => return Err(e),
        }
    }
}

/// Login handler
///
/// # Errors
///
/// * `400 email_and_password_required` - a field is missing
/// * `401 invalid_credentials` - unknown email or wrong password
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> BackendResult<Json<LoginResponse>> {
    let (email, password) = match (
        present(request.email),
        request.password.filter(|p| !p.is_empty()),
    ) {
        (Some(email), Some(password)) => (normalize_email(&email), password),
        _ => {
            tracing::warn!("Login rejected: missing email or password");
            return Err(BackendError::validation("email_and_password_required"));
        }
    };

    let user = match state.store.find_user_by_email(&email).await? {
        Some(user) => user,
        None => {
            tracing::warn!("Login failed: unknown email {}", email);
            return Err(BackendError::unauthorized("invalid_credentials"));
        }
    };

    if !verify_password(password, user.password_hash.clone()).await? {
        tracing::warn!("Login failed: wrong password for {}", email);
        return Err(BackendError::unauthorized("invalid_credentials"));
    }

    let mut user = ensure_identity(state.store.as_ref(), user).await?;

    let now = Utc::now();
    match state
        .store
        .adjust_user_counters(user.id, UserCounterDelta::default().touched(now))
        .await
    {
        Ok(()) => user.last_active_at = now,
        Err(e) => tracing::warn!("Failed to refresh last activity for {}: {}", user.id, e),
    }

    let token = create_token(user.id, user.email.clone(), &state.config.jwt_secret)
        .map_err(|e| BackendError::internal(format!("failed to create token: {}", e)))?;

    tracing::info!("User logged in successfully: {}", user.id);

    Ok(Json(LoginResponse::new(user, token)))
}
