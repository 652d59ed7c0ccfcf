//! Application state management.

use crate::config::{Config, ValidationConfig};
use crate::store::{StoreError, TradeStore};
use std::sync::Arc;

/// Application state shared across all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The trade store.
    pub store: Arc<TradeStore>,
    /// Request validation rules.
    pub validation: Arc<ValidationConfig>,
}

impl AppState {
    /// Creates application state around an opened store.
    #[must_use]
    pub fn new(store: TradeStore, validation: ValidationConfig) -> Self {
        Self {
            store: Arc::new(store),
            validation: Arc::new(validation),
        }
    }

    /// Opens the store named by the configuration and builds the state.
    ///
    /// # Errors
    /// Returns error if the trade directory cannot be created.
    pub async fn from_config(config: &Config) -> Result<Self, StoreError> {
        let store = TradeStore::open(&config.storage.trades_dir).await?;
        Ok(Self::new(store, config.validation.clone()))
    }
}
