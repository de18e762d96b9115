/**
 * Server Initialization
 *
 * # Initialization Process
 *
 * 1. Select the store (PostgreSQL when reachable, otherwise in-memory)
 * 2. Seed the default room and badge catalog if enabled
 * 3. Backfill expiry on posts stored without one
 * 4. Start the periodic expiration sweep (first run is immediate)
 * 5. Build the router
 *
 * Steps 2 and 3 are logged and skipped on failure; the server still
 * starts.
 */

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use chrono::Utc;

use crate::backend::catalog::seed_catalog;
use crate::backend::expiration::{backfill_missing_expiry, spawn_sweeper};
use crate::backend::routes::router::create_router;
use crate::backend::server::config::{load_store, AppConfig};
use crate::backend::server::state::AppState;
use crate::backend::store::Store;

/// Build the router over an existing store without starting any
/// background job
pub fn build_app(store: Arc<dyn Store>, config: AppConfig) -> (Router<()>, AppState) {
    let app_state = AppState::new(store, config);
    (create_router(app_state.clone()), app_state)
}

/// Create and configure the Axum application
pub async fn create_app(config: AppConfig) -> Router<()> {
    tracing::info!("Initializing tearoom backend server");

    let store = load_store(&config).await;
    tracing::info!("Using {} store", store.backend_name());

    if config.seed_catalog {
        if let Err(e) = seed_catalog(store.as_ref(), Utc::now()).await {
            tracing::warn!("Catalog seeding skipped: {}", e);
        }
    }

    let sweep_interval = Duration::from_secs(config.sweep_interval_secs);
    let (app, app_state) = build_app(store, config);

    if let Err(e) = backfill_missing_expiry(app_state.store.as_ref(), &app_state.policy).await {
        tracing::warn!("Expiry backfill skipped: {}", e);
    }

    spawn_sweeper(app_state.store.clone(), sweep_interval);
    tracing::info!(
        "Expiration sweep scheduled every {}s",
        sweep_interval.as_secs()
    );

    app
}
