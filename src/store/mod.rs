//! File-backed persistence for trade records.
//!
//! Each record lives in its own `<trade_id>.json` file under a single
//! container directory. There is no cache and no index: a record exists
//! exactly when its file does.

mod error;
mod locks;
mod record;
mod trade_store;

pub use error::StoreError;
pub use locks::KeyedLocks;
pub use record::{
    TIMESTAMP_FIELD, TRADE_ID_FIELD, TradeRecord, UPDATED_TIMESTAMP_FIELD, is_valid_trade_id,
    now_iso8601,
};
pub use trade_store::TradeStore;
