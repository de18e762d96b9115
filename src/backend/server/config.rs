/**
 * Server Configuration
 *
 * `AppConfig` holds every tunable the server reads at startup. Values are
 * layered:
 *
 * 1. Built-in defaults
 * 2. An optional TOML file (`TEAROOM_CONFIG`, else `tearoom.toml` in the
 *    working directory when it exists)
 * 3. Environment variables
 *
 * # Environment Variables
 *
 * | Variable                | Field                  |
 * |-------------------------|------------------------|
 * | `PORT`                  | `port`                 |
 * | `DATABASE_URL`          | `database_url`         |
 * | `JWT_SECRET`            | `jwt_secret`           |
 * | `BCRYPT_COST`           | `bcrypt_cost`          |
 * | `SWEEP_INTERVAL_SECS`   | `sweep_interval_secs`  |
 * | `DEFAULT_POST_DURATION` | `default_duration`     |
 * | `ENFORCE_MAX_DURATION`  | `enforce_max_duration` |
 * | `DEMO_USER_ID`          | `demo_user_id`         |
 * | `SESSION_CAPACITY`      | `session_capacity`     |
 * | `SEED_CATALOG`          | `seed_catalog`         |
 *
 * # Store Selection
 *
 * `load_store` connects to PostgreSQL when `database_url` is set and the
 * connection succeeds. Otherwise it logs a warning and hands back an
 * in-memory store so the server still starts.
 */

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;

use crate::backend::store::{MemoryStore, PgStore, Store};
use crate::shared::PostDuration;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Listen port
    pub port: u16,
    /// PostgreSQL URL; `None` selects the in-memory store
    pub database_url: Option<String>,
    /// Secret for signing session tokens
    pub jwt_secret: String,
    /// bcrypt work factor
    pub bcrypt_cost: u32,
    /// Seconds between expiration sweeps
    pub sweep_interval_secs: u64,
    /// Lifetime used when a post does not ask for one
    pub default_duration: PostDuration,
    /// Clamp requested lifetimes to `default_duration`
    pub enforce_max_duration: bool,
    /// Identity whose reactions are never persisted
    pub demo_user_id: String,
    /// Maximum number of tracked client sessions
    pub session_capacity: usize,
    /// Insert the default rooms and badges at startup
    pub seed_catalog: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            database_url: None,
            jwt_secret: "tearoom-dev-secret-change-in-production".to_string(),
            bcrypt_cost: bcrypt::DEFAULT_COST,
            sweep_interval_secs: 600,
            default_duration: PostDuration::Day,
            enforce_max_duration: true,
            demo_user_id: "demo-user".to_string(),
            session_capacity: 1024,
            seed_catalog: true,
        }
    }
}

impl AppConfig {
    /// Load defaults, then the optional TOML file, then environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var("TEAROOM_CONFIG") {
            Ok(path) => Self::from_file(&path)?,
            Err(_) if Path::new("tearoom.toml").exists() => Self::from_file("tearoom.toml")?,
            Err(_) => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parse a TOML file; fields it omits keep their defaults
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        Self::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Apply overrides from a key lookup (the process environment in production)
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("PORT") {
            self.port = parse_value("PORT", &v)?;
        }
        if let Some(v) = lookup("DATABASE_URL") {
            self.database_url = Some(v).filter(|v| !v.trim().is_empty());
        }
        if let Some(v) = lookup("JWT_SECRET") {
            self.jwt_secret = v;
        }
        if let Some(v) = lookup("BCRYPT_COST") {
            self.bcrypt_cost = parse_value("BCRYPT_COST", &v)?;
        }
        if let Some(v) = lookup("SWEEP_INTERVAL_SECS") {
            self.sweep_interval_secs = parse_value("SWEEP_INTERVAL_SECS", &v)?;
        }
        if let Some(v) = lookup("DEFAULT_POST_DURATION") {
            self.default_duration = parse_value("DEFAULT_POST_DURATION", &v)?;
        }
        if let Some(v) = lookup("ENFORCE_MAX_DURATION") {
            self.enforce_max_duration = parse_value("ENFORCE_MAX_DURATION", &v)?;
        }
        if let Some(v) = lookup("DEMO_USER_ID") {
            self.demo_user_id = v;
        }
        if let Some(v) = lookup("SESSION_CAPACITY") {
            self.session_capacity = parse_value("SESSION_CAPACITY", &v)?;
        }
        if let Some(v) = lookup("SEED_CATALOG") {
            self.seed_catalog = parse_value("SEED_CATALOG", &v)?;
        }
        self.validate()
    }

    /// Reject values the server cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sweep_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "sweep_interval_secs",
                value: "0".to_string(),
            });
        }
        if self.session_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                key: "session_capacity",
                value: "0".to_string(),
            });
        }
        if !(4..=31).contains(&self.bcrypt_cost) {
            return Err(ConfigError::InvalidValue {
                key: "bcrypt_cost",
                value: self.bcrypt_cost.to_string(),
            });
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

/// Connect to PostgreSQL and run migrations
///
/// Returns `None` when the URL is missing or the connection fails. A
/// failed migration is logged and the pool is still returned, since the
/// schema may already be in place.
pub async fn load_database(database_url: Option<&str>) -> Option<PgPool> {
    let database_url = match database_url {
        Some(url) => url,
        None => {
            tracing::warn!("DATABASE_URL not set. Using the in-memory store; data will not persist.");
            return None;
        }
    };

    tracing::info!("Connecting to database...");

    let pool = match PgPool::connect(database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to create database connection pool: {:?}", e);
            tracing::warn!("Using the in-memory store; data will not persist.");
            return None;
        }
    };

    tracing::info!("Database connection pool created successfully");

    tracing::info!("Running database migrations...");
    match sqlx::migrate!().run(&pool).await {
        Ok(_) => {
            tracing::info!("Database migrations completed successfully");
        }
        Err(e) => {
            tracing::error!("Failed to run database migrations: {}", e);
            tracing::warn!("Continuing without migrations - database might not be up to date");
        }
    }

    Some(pool)
}

/// Pick the entity store for this process
pub async fn load_store(config: &AppConfig) -> Arc<dyn Store> {
    match load_database(config.database_url.as_deref()).await {
        Some(pool) => Arc::new(PgStore::new(pool)),
        None => Arc::new(MemoryStore::new()),
    }
}
