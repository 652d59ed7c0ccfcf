//! Error types for the trade store.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Trade store error types.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The container directory could not be created.
    #[error("failed to create trade directory {}: {source}", path.display())]
    CreateContainer {
        /// Container path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// A record could not be written.
    #[error("failed to write trade {trade_id}: {source}")]
    Write {
        /// Identifier of the record being written.
        trade_id: String,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// A record exists but could not be read.
    #[error("failed to read trade {trade_id}: {source}")]
    Read {
        /// Identifier of the record being read.
        trade_id: String,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// A record exists but does not contain a JSON object.
    #[error("trade {trade_id} is corrupt: {source}")]
    Corrupt {
        /// Identifier of the corrupt record.
        trade_id: String,
        /// Parse error.
        source: serde_json::Error,
    },

    /// A record could not be encoded.
    #[error("failed to serialize trade {trade_id}: {source}")]
    Serialize {
        /// Identifier of the record being encoded.
        trade_id: String,
        /// Encoding error.
        source: serde_json::Error,
    },

    /// The container directory could not be listed.
    #[error("failed to list trades in {}: {source}", path.display())]
    List {
        /// Container path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// A record file could not be removed.
    #[error("failed to delete trade {trade_id}: {source}")]
    Delete {
        /// Identifier of the record being removed.
        trade_id: String,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// A caller-supplied identifier cannot name a record file.
    #[error("invalid trade_id: {0}")]
    InvalidTradeId(String),
}

impl StoreError {
    /// Returns true when the error was caused by the caller's input rather
    /// than by the storage medium.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, StoreError::InvalidTradeId(_))
    }
}
