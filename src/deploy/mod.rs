//! Deployment receiver.
//!
//! Accepts GitHub push webhooks and manual triggers, then runs a local
//! deployment script that pulls and restarts the API container.

pub mod config;
pub mod error;
pub mod handlers;
pub mod runner;
pub mod signature;

pub use config::DeployConfig;
pub use error::DeployError;
pub use handlers::DeployState;

use crate::api::handlers::{method_not_allowed, route_not_found};
use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;

/// Creates the deployment receiver router.
pub fn create_router(state: Arc<DeployState>) -> Router {
    Router::new()
        .route("/webhook/github", post(handlers::github_webhook))
        .route("/webhook/manual", post(handlers::manual_deployment))
        .route("/health", get(handlers::receiver_health))
        .route("/status", get(handlers::deployment_status))
        .fallback(route_not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .with_state(state)
}
