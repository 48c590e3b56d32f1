//! Upstream source registry and factory
//!
//! This module provides:
//! - The `MarketSource` / `FxSource` seams
//! - HTTP implementations for the supported providers
//! - A factory function to resolve a market source by name
//!
//! The rest of the application must interact exclusively through
//! the traits in `adapter`.

pub mod adapter;
pub mod coinbase;
pub mod exchangerate;

use std::sync::Arc;

use adapter::MarketSource;

use crate::config::SourcesConfig;

/// Returns a market source instance by name.
///
/// CONTRACT:
/// - `cfg.market` MUST match a provider name below
/// - Provider names are lowercase and stable
///
/// RETURNS:
/// - `Ok(None)` if the provider is unknown
/// - `Err` if the HTTP client cannot be built
///
pub fn get_market_source(
    cfg: &SourcesConfig,
) -> Result<Option<Arc<dyn MarketSource>>, reqwest::Error> {
    match cfg.market.as_str() {
        "coinbase" => Ok(Some(Arc::new(coinbase::CoinbaseSource::new(cfg)?))),
        _ => Ok(None),
    }
}

/// Installs `ring` as the process-wide rustls crypto provider.
///
/// rustls >= 0.23 requires an explicit CryptoProvider when more than
/// one backend is compiled in. Must run before the first HTTPS client
/// is built. Calling it again is a no-op.
pub fn install_crypto_provider() {
    let _ = rustls::crypto::CryptoProvider::install_default(
        rustls::crypto::ring::default_provider(),
    );
}

/// Shared reqwest client builder: timeout + user agent.
pub(crate) fn http_client(cfg: &SourcesConfig) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(cfg.request_timeout())
        .user_agent(cfg.user_agent.clone())
        .build()
}

/// Issues a GET and decodes the body as JSON.
///
/// Non-2xx statuses are reported as `SourceError::Status` before
/// the body is read.
pub(crate) async fn get_json(
    client: &reqwest::Client,
    url: &str,
) -> Result<serde_json::Value, crate::error::SourceError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(crate::error::SourceError::Status(status.as_u16()));
    }
    Ok(response.json().await?)
}
