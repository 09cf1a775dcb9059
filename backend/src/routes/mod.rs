//! Route definitions for the field report server

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Store status (public)
        .route("/health", get(handlers::store_health))
        // Public share links
        .route("/share/:token", get(handlers::get_shared_report))
        // Share-link troubleshooting (public, disabled by default in production)
        .route("/diagnostics/share/:token", get(handlers::diagnose_share))
        // Protected routes - owner reports
        .nest("/reports", report_routes(state))
}

/// Owner report routes (protected)
fn report_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_reports))
        .route("/:id", get(handlers::get_report))
        .route(
            "/:id/share",
            post(handlers::create_share_link).delete(handlers::revoke_share_link),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
