//! Trade Records Backend Server
//!
//! REST API server for storing and retrieving trade records.

use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trade_records_backend::api::{create_router, with_request_timeout};
use trade_records_backend::config::Config;
use trade_records_backend::state::AppState;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use trade_records_backend::error::{ErrorResponse, MissingFieldsResponse};
use trade_records_backend::models::{
    CreateTradeResponse, DeleteTradeResponse, HealthResponse, TradeInput, TradeResponse,
    TradesListResponse, UpdateTradeResponse,
};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    paths(
        trade_records_backend::api::handlers::health_check,
        trade_records_backend::api::handlers::create_trade,
        trade_records_backend::api::handlers::list_trades,
        trade_records_backend::api::handlers::get_trade,
        trade_records_backend::api::handlers::update_trade,
        trade_records_backend::api::handlers::delete_trade,
    ),
    components(
        schemas(
            HealthResponse,
            TradeInput,
            CreateTradeResponse,
            TradeResponse,
            TradesListResponse,
            UpdateTradeResponse,
            DeleteTradeResponse,
            ErrorResponse,
            MissingFieldsResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Trades", description = "Trade record management"),
    ),
    info(
        title = "Trade Records API",
        version = "0.2.0",
        description = "REST API for storing trade records as JSON documents",
        license(name = "MIT"),
        contact(name = "Joaquin Bejar", email = "jb@taunais.com")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Initialize tracing
    let default_filter = if config.environment.is_debug() {
        "debug,tower_http=debug"
    } else {
        "info,tower_http=debug"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Create application state
    let state = Arc::new(AppState::from_config(&config).await?);
    info!(
        "Storing trades in {}",
        config.storage.trades_dir.display()
    );

    let addr = config.bind_addr();
    info!("Starting Trade Records Backend on {}", addr);
    info!("Swagger UI available at http://{}/swagger-ui/", addr);

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the router
    let app = create_router(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));
    let app = with_request_timeout(app, config.request_timeout())
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start the server
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
