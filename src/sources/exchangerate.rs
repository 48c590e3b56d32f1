use reqwest::Client;
use serde_json::Value;

use crate::{config::SourcesConfig, error::SourceError};

use super::{adapter::FxSource, get_json, http_client};

/// exchangerate-api.com source
///
/// `GET {base_url}/v4/latest/{BASE}` returns every rate quoted
/// against BASE; the caller picks the reference currency out of
/// `rates`.
pub struct ExchangeRateSource {
    client: Client,
    base_url: String,
}

impl ExchangeRateSource {
    pub fn new(cfg: &SourcesConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: http_client(cfg)?,
            base_url: cfg.fx_url.trim_end_matches('/').to_string(),
        })
    }

    fn latest_url(&self, base: &str) -> String {
        format!("{}/v4/latest/{}", self.base_url, base.trim().to_uppercase())
    }
}

#[async_trait::async_trait]
impl FxSource for ExchangeRateSource {
    async fn latest_rates(&self, base: &str) -> Result<Value, SourceError> {
        get_json(&self.client, &self.latest_url(base)).await
    }
}
