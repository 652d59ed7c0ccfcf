//! Request and response models for the REST API.

use crate::store::TradeRecord;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Health check response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Status message.
    pub message: String,
    /// Current server time (ISO-8601).
    pub timestamp: String,
}

/// Trade fields accepted on create and update.
///
/// Bodies are parsed as free-form JSON objects so extra fields such as
/// `trader_id`, `account` or `notes` are stored verbatim; this type only
/// documents the common fields.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TradeInput {
    /// Instrument symbol (e.g., "AAPL").
    pub symbol: String,
    /// Traded quantity.
    pub quantity: f64,
    /// Execution price.
    pub price: f64,
    /// "BUY" or "SELL".
    pub side: String,
}

/// Response after creating a trade.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateTradeResponse {
    /// Descriptive message.
    pub message: String,
    /// Identifier of the stored trade.
    pub trade_id: String,
    /// The trade as stored, including injected fields.
    #[schema(value_type = Object)]
    pub trade_data: TradeRecord,
}

/// Response for fetching a single trade.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TradeResponse {
    /// Descriptive message.
    pub message: String,
    /// The stored trade.
    #[schema(value_type = Object)]
    pub trade_data: TradeRecord,
}

/// Response for listing all trades.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TradesListResponse {
    /// Descriptive message.
    pub message: String,
    /// Number of trades returned.
    pub count: usize,
    /// All stored trades, unordered.
    #[schema(value_type = Vec<Object>)]
    pub trades: Vec<TradeRecord>,
}

/// Response after replacing a trade.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateTradeResponse {
    /// Descriptive message.
    pub message: String,
    /// Identifier of the replaced trade.
    pub trade_id: String,
    /// The trade as stored after replacement.
    #[schema(value_type = Object)]
    pub trade_data: TradeRecord,
}

/// Response after deleting a trade.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteTradeResponse {
    /// Descriptive message.
    pub message: String,
    /// Identifier of the deleted trade.
    pub trade_id: String,
}
