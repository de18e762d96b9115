/**
 * Router Configuration
 *
 * Combines the endpoint table into the served router.
 *
 * # Layers
 *
 * Outermost first:
 * 1. `TraceLayer` - request/response spans
 * 2. `CorsLayer::permissive()` - any origin
 * 3. session tracking - records each request in the diagnostic log
 *
 * # Fallback
 *
 * Unknown paths get the standard JSON error body with `route_not_found`.
 */

use axum::{middleware, Router};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::backend::error::BackendError;
use crate::backend::middleware::track_session;
use crate::backend::routes::api_routes::api_routes;
use crate::backend::server::state::AppState;

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router<()> {
    let api = api_routes();

    Router::new()
        .merge(api.clone())
        .nest("/api", api)
        .fallback(|| async { BackendError::not_found("route_not_found") })
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn_with_state(
                    app_state.sessions.clone(),
                    track_session,
                )),
        )
        .with_state(app_state)
}
