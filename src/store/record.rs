//! Trade record representation.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field holding the record identifier.
pub const TRADE_ID_FIELD: &str = "trade_id";

/// Field holding the creation time.
pub const TIMESTAMP_FIELD: &str = "timestamp";

/// Field holding the time of the last update.
pub const UPDATED_TIMESTAMP_FIELD: &str = "updated_timestamp";

/// Returns the current UTC time as an ISO-8601 string.
#[must_use]
pub fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Checks whether an identifier can safely name a record file.
///
/// Only ASCII alphanumerics, `-` and `_` are accepted, which covers the
/// hyphenated UUIDs the store generates.
#[must_use]
pub fn is_valid_trade_id(trade_id: &str) -> bool {
    !trade_id.is_empty()
        && trade_id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// A single trade record.
///
/// The store treats records as opaque ordered maps. Only `trade_id`,
/// `timestamp` and `updated_timestamp` carry meaning; every other field is
/// kept exactly as the caller sent it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TradeRecord(Map<String, Value>);

impl TradeRecord {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Builds a record from a JSON value, returning `None` unless it is an object.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Returns the value of a field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Sets a field, returning the previous value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    /// Removes a field, returning its value.
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.shift_remove(field)
    }

    /// Returns true if the field is present, whatever its value.
    #[must_use]
    pub fn contains_field(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the record has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The record identifier, if set to a non-empty string.
    #[must_use]
    pub fn trade_id(&self) -> Option<&str> {
        self.str_field(TRADE_ID_FIELD).filter(|id| !id.is_empty())
    }

    /// The creation timestamp.
    #[must_use]
    pub fn timestamp(&self) -> Option<&str> {
        self.str_field(TIMESTAMP_FIELD)
    }

    /// The last update timestamp.
    #[must_use]
    pub fn updated_timestamp(&self) -> Option<&str> {
        self.str_field(UPDATED_TIMESTAMP_FIELD)
    }

    /// Returns the required fields that are absent, in the order given.
    ///
    /// Presence is by key: a field sent as `null` counts as present.
    #[must_use]
    pub fn missing_fields(&self, required: &[String]) -> Vec<String> {
        required
            .iter()
            .filter(|field| !self.contains_field(field))
            .cloned()
            .collect()
    }

    /// Iterates over fields in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Consumes the record, returning the underlying map.
    #[must_use]
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }

    fn str_field(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }
}

impl From<Map<String, Value>> for TradeRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<TradeRecord> for Value {
    fn from(record: TradeRecord) -> Self {
        Value::Object(record.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn required() -> Vec<String> {
        ["symbol", "quantity", "price", "side"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_from_value_rejects_non_objects() {
        assert!(TradeRecord::from_value(json!([1, 2, 3])).is_none());
        assert!(TradeRecord::from_value(json!("AAPL")).is_none());
        assert!(TradeRecord::from_value(json!(null)).is_none());
        assert!(TradeRecord::from_value(json!({})).is_some());
    }

    #[test]
    fn test_missing_fields_preserves_required_order() {
        let record = TradeRecord::from_value(json!({"symbol": "AAPL"})).unwrap();
        assert_eq!(
            record.missing_fields(&required()),
            vec!["quantity", "price", "side"]
        );
    }

    #[test]
    fn test_missing_fields_counts_null_as_present() {
        let record = TradeRecord::from_value(json!({
            "symbol": "AAPL",
            "quantity": null,
            "price": 1.0,
            "side": "BUY"
        }))
        .unwrap();
        assert!(record.missing_fields(&required()).is_empty());
    }

    #[test]
    fn test_trade_id_ignores_empty_and_non_string() {
        let empty = TradeRecord::from_value(json!({"trade_id": ""})).unwrap();
        assert_eq!(empty.trade_id(), None);

        let numeric = TradeRecord::from_value(json!({"trade_id": 42})).unwrap();
        assert_eq!(numeric.trade_id(), None);

        let set = TradeRecord::from_value(json!({"trade_id": "abc-123"})).unwrap();
        assert_eq!(set.trade_id(), Some("abc-123"));
    }

    #[test]
    fn test_field_order_survives_serialization() {
        let record = TradeRecord::from_value(json!({
            "side": "SELL",
            "symbol": "MSFT",
            "notes": {"desk": "A"},
            "quantity": 75
        }))
        .unwrap();

        let encoded = serde_json::to_string(&record).unwrap();
        assert_eq!(
            encoded,
            r#"{"side":"SELL","symbol":"MSFT","notes":{"desk":"A"},"quantity":75}"#
        );
    }

    #[test]
    fn test_is_valid_trade_id() {
        assert!(is_valid_trade_id("0b6f4c1e-8a7d-4f0e-9d55-0c1f7d2f9a10"));
        assert!(is_valid_trade_id("legacy_ID_7"));
        assert!(!is_valid_trade_id(""));
        assert!(!is_valid_trade_id("../etc/passwd"));
        assert!(!is_valid_trade_id("a/b"));
        assert!(!is_valid_trade_id("with space"));
        assert!(!is_valid_trade_id("dot.json"));
    }

    #[test]
    fn test_now_iso8601_parses_back() {
        let now = now_iso8601();
        assert!(chrono::DateTime::parse_from_rfc3339(&now).is_ok());
        assert!(now.ends_with('Z'));
    }
}
