//! HTTP client library for the Trade Records API.
//!
//! This crate provides a typed HTTP client for the trade records backend,
//! plus helpers for bulk-loading sample trades.
//!
//! # Example
//!
//! ```no_run
//! use trade_client::{ClientConfig, TradeClient, TradeRequest, TradeSide};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), trade_client::Error> {
//!     let client = TradeClient::new(ClientConfig {
//!         base_url: "http://localhost:5000".into(),
//!         timeout: Duration::from_secs(30),
//!     })?;
//!
//!     // Check health
//!     let health = client.health_check().await?;
//!     println!("Status: {}", health.status);
//!
//!     let trade = TradeRequest::new("AAPL", 100.0, 150.25, TradeSide::Buy)
//!         .with_field("trader_id", "john_doe");
//!     let created = client.create_trade(&trade).await?;
//!     println!("Created {}", created.trade_id);
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
pub mod loader;
mod types;

pub use client::{ClientConfig, TradeClient};
pub use error::Error;
pub use types::*;
