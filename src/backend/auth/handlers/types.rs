//! Request and Response Types
//!
//! Wire shapes for the user endpoints. Request fields are optional so a
//! missing field is reported with a reason code instead of a generic
//! body rejection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::User;

/// Signup request
#[derive(Debug, Default, Deserialize)]
pub struct SignupRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Login request
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Returned by signup
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub alias: Option<String>,
    pub anonymous_id: Option<String>,
    pub token: String,
}

/// Returned by login
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub alias: Option<String>,
    pub anonymous_id: Option<String>,
    pub total_posts: i64,
    pub total_reactions: i64,
    pub last_active_at: DateTime<Utc>,
    pub token: String,
}

impl LoginResponse {
    pub fn new(user: User, token: String) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            alias: user.alias,
            anonymous_id: user.anonymous_id,
            total_posts: user.total_posts,
            total_reactions: user.total_reactions,
            last_active_at: user.last_active_at,
            token,
        }
    }
}

/// Ephemeral anonymous identity, never stored
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnonymousResponse {
    /// Always `null`
    pub id: Option<Uuid>,
    pub name: String,
    pub alias: String,
    pub anonymous_id: String,
}

/// Entry in the user listing
#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}
