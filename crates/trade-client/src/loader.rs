//! Bulk loading of sample trades.

use crate::client::TradeClient;
use crate::error::Error;
use serde_json::Value;
use std::path::Path;

/// A trade that could not be created.
#[derive(Debug)]
pub struct FailedTrade {
    /// 1-based position in the input.
    pub index: usize,
    /// The trade's symbol, or `"?"` when absent.
    pub symbol: String,
    /// Why it failed.
    pub error: Error,
}

/// Outcome of a bulk load.
#[derive(Debug, Default)]
pub struct LoadSummary {
    /// Identifiers of created trades, in input order.
    pub created: Vec<String>,
    /// Trades the server rejected or that could not be sent.
    pub failed: Vec<FailedTrade>,
}

impl LoadSummary {
    /// Number of trades attempted.
    #[must_use]
    pub fn total(&self) -> usize {
        self.created.len() + self.failed.len()
    }

    /// Whether every trade was created.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Reads a JSON array of trades from `path`.
///
/// # Errors
/// Returns error if the file cannot be read, is not JSON, or is not an array.
pub fn read_trades(path: impl AsRef<Path>) -> Result<Vec<Value>, Error> {
    let content = std::fs::read_to_string(path)?;
    match serde_json::from_str::<Value>(&content)? {
        Value::Array(trades) => Ok(trades),
        _ => Err(Error::InvalidRequest(
            "Sample file must hold a JSON array of trades".to_string(),
        )),
    }
}

fn symbol_of(trade: &Value) -> String {
    trade
        .get("symbol")
        .and_then(Value::as_str)
        .unwrap_or("?")
        .to_string()
}

/// Creates each trade in turn, continuing past failures.
pub async fn load_trades(client: &TradeClient, trades: &[Value]) -> LoadSummary {
    let mut summary = LoadSummary::default();

    for (i, trade) in trades.iter().enumerate() {
        match client.create_trade(trade).await {
            Ok(created) => summary.created.push(created.trade_id),
            Err(error) => summary.failed.push(FailedTrade {
                index: i + 1,
                symbol: symbol_of(trade),
                error,
            }),
        }
    }

    summary
}

/// Deletes every stored trade, returning how many were deleted.
///
/// Trades deleted concurrently by someone else are not counted and do not
/// fail the call.
///
/// # Errors
/// Returns error if the listing fails or a delete fails for another reason.
pub async fn clear_all_trades(client: &TradeClient) -> Result<usize, Error> {
    let listing = client.list_trades().await?;
    let mut deleted = 0;

    for trade in &listing.trades {
        let Some(trade_id) = trade.get("trade_id").and_then(Value::as_str) else {
            continue;
        };
        match client.delete_trade(trade_id).await {
            Ok(_) => deleted += 1,
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }
    }

    Ok(deleted)
}
