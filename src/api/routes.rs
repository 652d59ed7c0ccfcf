//! Route configuration.

use crate::api::handlers;
use crate::state::AppState;
use axum::Router;
use axum::error_handling::HandleErrorLayer;
use axum::routing::get;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower::timeout::TimeoutLayer;

#[cfg(test)]
mod tests;

/// Path prefixes the trade routes are mounted under. The `/api` form is the
/// one existing clients and scripts use.
const TRADE_PREFIXES: [&str; 2] = ["", "/api"];

/// Creates the API router.
pub fn create_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        // Health check
        .route("/health", get(handlers::health_check));

    // Trades
    for prefix in TRADE_PREFIXES {
        router = router
            .route(
                &format!("{prefix}/trades"),
                get(handlers::list_trades).post(handlers::create_trade),
            )
            .route(
                &format!("{prefix}/trades/{{trade_id}}"),
                get(handlers::get_trade)
                    .put(handlers::update_trade)
                    .delete(handlers::delete_trade),
            );
    }

    router
        .fallback(handlers::route_not_found)
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .with_state(state)
}

/// Bounds every request by `timeout`. Requests that run over get a 408 with
/// the usual `{error, message}` body.
pub fn with_request_timeout(router: Router, timeout: Duration) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(handlers::request_failed))
            .layer(TimeoutLayer::new(timeout)),
    )
}
