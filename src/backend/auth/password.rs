//! Password hashing
//!
//! bcrypt runs on the blocking pool so a login does not stall the
//! request workers.

use crate::backend::error::{BackendError, BackendResult};

pub async fn hash_password(password: String, cost: u32) -> BackendResult<String> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| BackendError::internal(format!("hash task failed: {}", e)))?
        .map_err(|e| BackendError::internal(format!("failed to hash password: {}", e)))
}

/// A malformed stored hash counts as a mismatch
pub async fn verify_password(password: String, hash: String) -> BackendResult<bool> {
    let outcome = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| BackendError::internal(format!("verify task failed: {}", e)))?;
    match outcome {
        Ok(matches) => Ok(matches),
        Err(e) => {
            tracing::warn!("Stored password hash could not be verified: {}", e);
            Ok(false)
        }
    }
}
