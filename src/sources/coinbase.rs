use reqwest::Client;
use serde_json::Value;

use crate::{config::SourcesConfig, error::SourceError};

use super::{adapter::MarketSource, get_json, http_client};

/// Coinbase REST source
///
/// Two hosts are involved:
/// - Exchange API (`api.exchange.coinbase.com`): products + 24h stats
/// - Retail API (`api.coinbase.com`): spot prices
///
/// DESIGN:
/// - Pure HTTP transport
/// - No parsing beyond JSON decoding
/// - No retry logic (a miss is absorbed by the caller)
pub struct CoinbaseSource {
    client: Client,
    exchange_url: String,
    api_url: String,
}

impl CoinbaseSource {
    pub fn new(cfg: &SourcesConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: http_client(cfg)?,
            exchange_url: cfg.exchange_url.trim_end_matches('/').to_string(),
            api_url: cfg.api_url.trim_end_matches('/').to_string(),
        })
    }

    fn products_url(&self) -> String {
        format!("{}/products", self.exchange_url)
    }

    fn spot_url(&self, pair: &str) -> String {
        format!("{}/v2/prices/{}/spot", self.api_url, pair)
    }

    fn stats_url(&self, pair: &str) -> String {
        format!("{}/products/{}/stats", self.exchange_url, pair)
    }
}

#[async_trait::async_trait]
impl MarketSource for CoinbaseSource {

    fn name(&self) -> &'static str {
        "coinbase"
    }

    async fn list_products(&self) -> Result<Value, SourceError> {
        get_json(&self.client, &self.products_url()).await
    }

    async fn spot_price(&self, pair: &str) -> Result<Value, SourceError> {
        get_json(&self.client, &self.spot_url(pair)).await
    }

    async fn day_stats(&self, pair: &str) -> Result<Value, SourceError> {
        get_json(&self.client, &self.stats_url(pair)).await
    }
}
