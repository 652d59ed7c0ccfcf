//! # Trade Records Backend - REST API Server
//!
//! A small REST API for recording trades. Each trade is a free-form JSON
//! object stored as its own document in a directory on disk.
//! Built with [Axum](https://crates.io/crates/axum) for async HTTP handling and
//! provides OpenAPI/Swagger documentation via [utoipa](https://crates.io/crates/utoipa).
//!
//! ## Key Features
//!
//! - **RESTful API**: Create, read, replace, list and delete trade records.
//!
//! - **Schemaless Records**: Any JSON object with the required fields is
//!   accepted; extra fields are stored verbatim.
//!
//! - **File-Backed Storage**: One `<trade_id>.json` document per trade, written
//!   atomically, with per-identifier locking.
//!
//! - **OpenAPI Documentation**: Auto-generated Swagger UI for API exploration
//!   and testing at `/swagger-ui/`.
//!
//! - **Structured Logging**: Request tracing with `tower-http` for debugging
//!   and monitoring.
//!
//! - **Deployment Receiver**: A companion binary that turns GitHub push
//!   webhooks into deployments.
//!
//! ## Module Structure
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`api`] | Route handlers and router configuration |
//! | [`config`] | TOML and environment configuration |
//! | [`deploy`] | Webhook-driven deployment receiver |
//! | [`error`] | API error types with `IntoResponse` implementation |
//! | [`models`] | Response envelopes with OpenAPI schemas |
//! | [`state`] | Application state management |
//! | [`store`] | File-backed trade record store |
//!
//! ## API Endpoints
//!
//! Trade routes are also served under the `/api` prefix.
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/trades` | Create a trade |
//! | GET | `/trades` | List all trades |
//! | GET | `/trades/{trade_id}` | Get a trade |
//! | PUT | `/trades/{trade_id}` | Replace a trade |
//! | DELETE | `/trades/{trade_id}` | Delete a trade |
//!
//! ## Example Usage
//!
//! ### Starting the Server
//!
//! ```bash
//! # Development mode
//! cargo run
//!
//! # With custom host/port and storage directory
//! HOST=127.0.0.1 PORT=3000 TRADES_DIR=/var/lib/trades cargo run
//!
//! # Production defaults (loopback bind, info logging)
//! APP_ENV=production ./target/release/trade-records-backend
//! ```
//!
//! ### API Requests
//!
//! ```bash
//! # Create a trade
//! curl -X POST http://localhost:5000/trades \
//!   -H "Content-Type: application/json" \
//!   -d '{"symbol": "AAPL", "quantity": 100, "price": 150.25, "side": "BUY"}'
//!
//! # List trades
//! curl http://localhost:5000/trades
//!
//! # Replace a trade (fields not resent are dropped)
//! curl -X PUT http://localhost:5000/trades/<trade_id> \
//!   -H "Content-Type: application/json" \
//!   -d '{"symbol": "AAPL", "quantity": 125, "price": 151.0, "side": "BUY"}'
//!
//! # Delete a trade
//! curl -X DELETE http://localhost:5000/trades/<trade_id>
//! ```
//!
//! ## Swagger UI
//!
//! Once the server is running, access the interactive API documentation at:
//!
//! ```text
//! http://localhost:5000/swagger-ui/
//! ```
//!
//! ## Dependencies
//!
//! - **axum** (0.8): Async web framework
//! - **tower-http** (0.6): HTTP middleware (CORS, tracing, timeout)
//! - **utoipa** (5.4): OpenAPI documentation generation
//! - **utoipa-swagger-ui** (9.0): Swagger UI integration
//! - **tokio** (1.49): Async runtime and file I/O
//! - **serde** / **serde_json** (1.0): Serialization/deserialization
//! - **tracing** (0.1): Structured logging
//! - **hmac** / **sha2**: Webhook signature verification

pub mod api;
pub mod config;
pub mod deploy;
pub mod error;
pub mod models;
pub mod state;
pub mod store;
