/**
 * Application State Management
 *
 * `AppState` is the central state container handed to every handler.
 * It holds:
 * - the entity store (PostgreSQL or in-memory, behind one trait object)
 * - the loaded configuration
 * - the expiration policy derived from that configuration
 * - the diagnostic session tracker
 *
 * # State Extraction
 *
 * The `FromRef` implementations let handlers and middleware extract only
 * the part they need.
 *
 * ```rust,ignore
 * async fn handler(State(store): State<Arc<dyn Store>>) { /* ... */ }
 * ```
 */

use std::sync::Arc;

use axum::extract::FromRef;

use crate::backend::expiration::ExpirationPolicy;
use crate::backend::middleware::SessionTracker;
use crate::backend::server::config::AppConfig;
use crate::backend::store::Store;

/// Main application state
#[derive(Clone)]
pub struct AppState {
    /// Entity store shared by every component
    pub store: Arc<dyn Store>,
    /// Loaded configuration
    pub config: Arc<AppConfig>,
    /// Lifetime rules for new posts
    pub policy: ExpirationPolicy,
    /// Diagnostic session log
    pub sessions: SessionTracker,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: AppConfig) -> Self {
        let policy = ExpirationPolicy::from_config(&config);
        let sessions = SessionTracker::new(config.session_capacity);
        Self {
            store,
            config: Arc::new(config),
            policy,
            sessions,
        }
    }

    /// Whether `user_id` is the reserved demo identity
    pub fn is_demo_user(&self, user_id: &str) -> bool {
        user_id == self.config.demo_user_id
    }
}

impl FromRef<AppState> for Arc<dyn Store> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.store.clone()
    }
}

impl FromRef<AppState> for SessionTracker {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.sessions.clone()
    }
}

impl FromRef<AppState> for Arc<AppConfig> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.config.clone()
    }
}
