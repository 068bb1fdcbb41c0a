//! GeckoTerminal trade-history client for a single pool

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use volume_core::Trade;

use super::types::TradesResponse;
use super::TradeSource;

/// Default GeckoTerminal API base URL
pub const GECKO_API_BASE_URL: &str = "https://api.geckoterminal.com/api/v2";

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("API error ({status}): {body}")]
    Api { status: StatusCode, body: String },

    #[error("Deserialization failed: {0}")]
    Deserialize(String),

    #[error("Rate limit exceeded")]
    RateLimited,
}

/// Configuration for the trade feed
#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub base_url: String,
    pub network: String,
    pub pool_address: String,
    pub timeout: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: GECKO_API_BASE_URL.to_string(),
            network: "zero-network".to_string(),
            pool_address: "0x6911d086ce4056f8811ace85075927a085289698".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl FeedConfig {
    /// Full trades endpoint URL (without query string)
    pub fn trades_url(&self) -> String {
        format!(
            "{}/networks/{}/pools/{}/trades",
            self.base_url.trim_end_matches('/'),
            self.network,
            self.pool_address
        )
    }
}

/// Polls the pool's trade history. Returns trades newest-first, as the API does.
pub struct GeckoTerminalClient {
    config: FeedConfig,
    client: Client,
}

impl GeckoTerminalClient {
    pub fn new(config: FeedConfig) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { config, client })
    }

    async fn get_trades(&self) -> Result<TradesResponse, FeedError> {
        let url = self.config.trades_url();
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[("token", "quote")])
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!("Rate limit exceeded on trades endpoint");
            return Err(FeedError::RateLimited);
        }

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(FeedError::Api { status, body });
        }

        response
            .json::<TradesResponse>()
            .await
            .map_err(|e| FeedError::Deserialize(e.to_string()))
    }
}

#[async_trait]
impl TradeSource for GeckoTerminalClient {
    async fn fetch_trades(&self) -> Result<Vec<Trade>, FeedError> {
        let response = self.get_trades().await?;
        let records = response.data.len();
        let trades = response.into_trades();

        debug!(
            "Fetched {} trade records for pool {} ({} usable)",
            records,
            self.config.pool_address,
            trades.len()
        );

        Ok(trades)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trades_url() {
        let config = FeedConfig {
            base_url: "http://localhost:8080/api/v2/".to_string(),
            network: "eth".to_string(),
            pool_address: "0xpool".to_string(),
            ..FeedConfig::default()
        };
        assert_eq!(
            config.trades_url(),
            "http://localhost:8080/api/v2/networks/eth/pools/0xpool/trades"
        );
    }

    #[test]
    fn test_default_config_points_at_gecko() {
        let config = FeedConfig::default();
        assert!(config.trades_url().starts_with("https://api.geckoterminal.com/api/v2/networks/"));
        assert!(config.trades_url().ends_with("/trades"));
    }
}
