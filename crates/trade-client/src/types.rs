//! Request and response types for the Trade Records API.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;


/// A stored trade: a JSON object holding at least `trade_id`.
pub type Trade = Map<String, Value>;

// ============================================================================
// Enums
// ============================================================================

/// Trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeSide {
    /// Buy side.
    Buy,
    /// Sell side.
    Sell,
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeSide::Buy => write!(f, "BUY"),
            TradeSide::Sell => write!(f, "SELL"),
        }
    }
}

// ============================================================================
// Requests
// ============================================================================

/// Body for creating or replacing a trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRequest {
    /// Instrument symbol.
    pub symbol: String,
    /// Traded quantity.
    pub quantity: f64,
    /// Execution price.
    pub price: f64,
    /// Trade direction.
    pub side: TradeSide,
    /// Any further fields, stored verbatim by the server.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TradeRequest {
    /// Creates a request with the required fields.
    pub fn new(symbol: impl Into<String>, quantity: f64, price: f64, side: TradeSide) -> Self {
        Self {
            symbol: symbol.into(),
            quantity,
            price,
            side,
            extra: Map::new(),
        }
    }

    /// Adds an extra field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

// ============================================================================
// Responses
// ============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Status message.
    pub message: String,
    /// Server time.
    pub timestamp: String,
}

/// Response after creating a trade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTradeResponse {
    /// Message.
    pub message: String,
    /// Identifier of the new trade.
    pub trade_id: String,
    /// Trade as stored.
    pub trade_data: Trade,
}

/// Response for a single trade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeResponse {
    /// Message.
    pub message: String,
    /// The trade.
    pub trade_data: Trade,
}

/// Response for listing trades.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradesListResponse {
    /// Message.
    pub message: String,
    /// Number of trades.
    pub count: usize,
    /// The trades, unordered.
    pub trades: Vec<Trade>,
}

/// Response after replacing a trade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTradeResponse {
    /// Message.
    pub message: String,
    /// Identifier of the trade.
    pub trade_id: String,
    /// Trade as stored.
    pub trade_data: Trade,
}

/// Response after deleting a trade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteTradeResponse {
    /// Message.
    pub message: String,
    /// Identifier of the deleted trade.
    pub trade_id: String,
}

/// Error body returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    /// Short error title.
    pub error: String,
    /// Detail, absent on missing-field errors.
    #[serde(default)]
    pub message: Option<String>,
    /// Missing fields, on create validation errors.
    #[serde(default)]
    pub missing_fields: Option<Vec<String>>,
    /// Required fields, on create validation errors.
    #[serde(default)]
    pub required_fields: Option<Vec<String>>,
}
