//! Deployment Receiver
//!
//! Listens for GitHub push webhooks and runs the local deployment script.

use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trade_records_backend::deploy::{DeployConfig, DeployState, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = DeployConfig::from_env()?;

    if !config.secret_configured() {
        warn!("WEBHOOK_SECRET is not set; GitHub webhooks will be rejected");
    }
    info!("Deployment script: {}", config.script.display());
    info!("Allowed repositories: {}", config.allowed_repos.join(", "));

    let addr = config.bind_addr();
    let state = Arc::new(DeployState::new(config));

    let app = create_router(state).layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(&addr).await?;
    info!("Deployment receiver listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
