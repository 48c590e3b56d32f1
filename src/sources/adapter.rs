use serde_json::Value;

use crate::error::SourceError;

/// MarketSource is the abstraction layer between:
/// - The collector components (catalog, price, change)
/// - A specific market-data provider's REST API
///
/// Each implementation must:
/// - Perform exactly one HTTP request per call
/// - Map non-success status codes to `SourceError::Status`
/// - Return the decoded JSON body untouched
///
/// DESIGN GOALS:
/// - No field extraction here; "missing field" is a collector decision
/// - Swappable with in-memory fakes in tests
///
/// THREAD SAFETY:
/// - Must be Send + Sync
/// - One instance is shared by every concurrent fetch
///
#[async_trait::async_trait]
pub trait MarketSource: Send + Sync {

    /// Canonical provider name, matches `sources.market` in config.
    fn name(&self) -> &'static str;

    /// Full product listing.
    ///
    /// EXPECTED PAYLOAD:
    /// - JSON array of `{ "base_currency": "BTC", "status": "online", ... }`
    async fn list_products(&self) -> Result<Value, SourceError>;

    /// Spot price for one pair (e.g. "BTC-USD").
    ///
    /// EXPECTED PAYLOAD:
    /// - `{ "data": { "amount": "50000.00" } }`
    async fn spot_price(&self, pair: &str) -> Result<Value, SourceError>;

    /// 24h stats for one pair.
    ///
    /// EXPECTED PAYLOAD:
    /// - `{ "open": "49000.00", "last": "50000.00", ... }`
    ///
    /// NOTE:
    /// This endpoint is rate limited much harder than `spot_price`.
    /// Callers are expected to gate it.
    async fn day_stats(&self, pair: &str) -> Result<Value, SourceError>;
}

/// Fiat exchange-rate provider.
#[async_trait::async_trait]
pub trait FxSource: Send + Sync {

    /// Latest rates with `base` as the source currency.
    ///
    /// EXPECTED PAYLOAD:
    /// - `{ "rates": { "RUB": 92.5, ... } }`
    async fn latest_rates(&self, base: &str) -> Result<Value, SourceError>;
}
