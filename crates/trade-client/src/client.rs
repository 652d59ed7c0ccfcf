//! HTTP client for the trade records API.

use crate::error::Error;
use crate::types::*;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use url::Url;


/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API (e.g., "http://localhost:5000").
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// HTTP client for the Trade Records API.
#[derive(Debug, Clone)]
pub struct TradeClient {
    client: Client,
    base_url: String,
}

impl TradeClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    /// Returns error if the base URL is invalid or the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        Url::parse(&config.base_url)?;
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Creates a new client with default configuration.
    ///
    /// # Errors
    /// Returns error if the base URL is invalid or the HTTP client cannot be built.
    pub fn with_base_url(base_url: &str) -> Result<Self, Error> {
        Self::new(ClientConfig {
            base_url: base_url.to_string(),
            ..Default::default()
        })
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn trades_url(&self) -> String {
        format!("{}/api/trades", self.base_url)
    }

    /// URL of one trade, with `trade_id` percent-encoded as a single segment.
    fn trade_url(&self, trade_id: &str) -> Result<Url, Error> {
        let mut url = Url::parse(&self.trades_url())?;
        url.path_segments_mut()
            .map_err(|()| Error::InvalidRequest(format!("{} cannot take a path", self.base_url)))?
            .push(trade_id);
        Ok(url)
    }

    // ========================================================================
    // Health
    // ========================================================================

    /// Performs a health check.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn health_check(&self) -> Result<HealthResponse, Error> {
        let url = format!("{}/health", self.base_url);
        let resp = self.client.get(&url).send().await?;
        self.handle_response(resp).await
    }

    // ========================================================================
    // Trades
    // ========================================================================

    /// Creates a trade from any serializable JSON object.
    ///
    /// # Errors
    /// Returns error if the request fails or the server rejects the trade.
    pub async fn create_trade<T: Serialize + ?Sized>(
        &self,
        trade: &T,
    ) -> Result<CreateTradeResponse, Error> {
        let resp = self.client.post(self.trades_url()).json(trade).send().await?;
        self.handle_response(resp).await
    }

    /// Gets a trade by ID.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] if no such trade exists.
    pub async fn get_trade(&self, trade_id: &str) -> Result<TradeResponse, Error> {
        let resp = self.client.get(self.trade_url(trade_id)?).send().await?;
        self.handle_response(resp).await
    }

    /// Lists all trades.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn list_trades(&self) -> Result<TradesListResponse, Error> {
        let resp = self.client.get(self.trades_url()).send().await?;
        self.handle_response(resp).await
    }

    /// Replaces a trade. Fields not sent are dropped by the server.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] if no such trade exists.
    pub async fn update_trade<T: Serialize + ?Sized>(
        &self,
        trade_id: &str,
        trade: &T,
    ) -> Result<UpdateTradeResponse, Error> {
        let resp = self
            .client
            .put(self.trade_url(trade_id)?)
            .json(trade)
            .send()
            .await?;
        self.handle_response(resp).await
    }

    /// Deletes a trade.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] if no such trade exists.
    pub async fn delete_trade(&self, trade_id: &str) -> Result<DeleteTradeResponse, Error> {
        let resp = self.client.delete(self.trade_url(trade_id)?).send().await?;
        self.handle_response(resp).await
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();

        if status.is_success() {
            Ok(resp.json().await?)
        } else if status.as_u16() == 404 {
            let text = resp.text().await.unwrap_or_default();
            Err(Error::NotFound(text))
        } else {
            let text = resp.text().await.unwrap_or_default();
            Err(Error::Api {
                status: status.as_u16(),
                message: text,
            })
        }
    }
}
