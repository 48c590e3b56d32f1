use std::fs;
use std::time::Duration;

use anyhow::{bail, Context};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::collector::change::DEFAULT_CHANGE_CONCURRENCY;

// ------------------------------------------------------------
// Root configuration
// ------------------------------------------------------------
//
// This is the top-level configuration structure loaded from
// `config.json`.
//
// It defines:
// - Upstream API endpoints and request behaviour
// - Collection cadence and concurrency ceiling
// - Where observations are persisted
// - Optional debug configuration
//
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Upstream market-data and FX endpoints
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Collection cycle parameters
    #[serde(default)]
    pub collection: CollectionConfig,

    /// Persistence sink settings
    pub sink: SinkConfig,

    /// Optional debug configuration
    pub debug: Option<DebugConfig>,

    /// Period of the metrics reporter in seconds
    #[serde(default = "default_metrics_interval")]
    pub metrics_interval_secs: u64,
}

impl Config {
    /// Reads a JSON configuration file from disk and validates it.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading config file {path}"))?;
        let cfg: Config = serde_json::from_str(&data)
            .with_context(|| format!("parsing config file {path}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Rejects values that would make a collection cycle meaningless.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.collection.change_concurrency == 0 {
            bail!("collection.change_concurrency must be at least 1");
        }
        if self.collection.interval_secs == 0 {
            bail!("collection.interval_secs must be at least 1");
        }
        if self.collection.fallback_rate <= Decimal::ZERO {
            bail!("collection.fallback_rate must be positive");
        }
        if self.sources.request_timeout_secs == 0 {
            bail!("sources.request_timeout_secs must be at least 1");
        }
        Ok(())
    }

    pub fn debug_log(&self) -> bool {
        self.debug.as_ref().is_some_and(|d| d.log.unwrap_or(false))
    }
}

// ------------------------------------------------------------
// Source configuration
// ------------------------------------------------------------
//
// Base URLs are kept configurable so a staging mirror or a
// local recording proxy can stand in for the public APIs.
//
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SourcesConfig {
    /// Market source identifier (currently only "coinbase")
    pub market: String,

    /// Exchange API base (product listing + 24h stats)
    pub exchange_url: String,

    /// Retail API base (spot prices)
    pub api_url: String,

    /// FX rate API base
    pub fx_url: String,

    /// Quote currency the spot and stats pairs are priced in
    pub quote_currency: String,

    /// Fiat currency prices are converted into
    pub reference_currency: String,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl SourcesConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            market: "coinbase".to_string(),
            exchange_url: "https://api.exchange.coinbase.com".to_string(),
            api_url: "https://api.coinbase.com".to_string(),
            fx_url: "https://api.exchangerate-api.com".to_string(),
            quote_currency: "USD".to_string(),
            reference_currency: "RUB".to_string(),
            request_timeout_secs: 10,
            user_agent: concat!("crypto-price-collector/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

// ------------------------------------------------------------
// Collection configuration
// ------------------------------------------------------------
//
// `change_concurrency` caps in-flight 24h stats requests only.
// The stats endpoint throttles far earlier than the spot one.
//
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CollectionConfig {
    /// Seconds between scheduled collection cycles
    pub interval_secs: u64,

    /// Maximum concurrent 24h stats requests
    pub change_concurrency: usize,

    /// Conversion rate used when the FX endpoint cannot be read
    pub fallback_rate: Decimal,
}

impl CollectionConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            interval_secs: 60,
            change_concurrency: DEFAULT_CHANGE_CONCURRENCY,
            fallback_rate: Decimal::from(90),
        }
    }
}

// ------------------------------------------------------------
// Sink configuration
// ------------------------------------------------------------
//
// Notes:
// - `redis_url` may contain credentials and must not be committed.
// - `demo` disables writes entirely; observations are only logged.
//
#[derive(Debug, Deserialize, Clone)]
pub struct SinkConfig {
    /// Redis connection URL (redis://host:port/db)
    pub redis_url: String,

    /// Prefix for per-symbol history lists
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// Demo mode flag (nothing written, only logged)
    pub demo: Option<bool>,
}

// ------------------------------------------------------------
// Debug configuration
// ------------------------------------------------------------
#[derive(Debug, Deserialize, Clone)]
pub struct DebugConfig {
    /// Enables debug-level logging (overridden by RUST_LOG)
    pub log: Option<bool>,
}

fn default_metrics_interval() -> u64 {
    60
}

fn default_key_prefix() -> String {
    "crypto:history".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_takes_defaults() {
        let cfg: Config =
            serde_json::from_str(r#"{ "sink": { "redis_url": "redis://127.0.0.1/" } }"#).unwrap();

        assert_eq!(cfg.collection.change_concurrency, 4);
        assert_eq!(cfg.collection.interval_secs, 60);
        assert_eq!(cfg.collection.fallback_rate, Decimal::from(90));
        assert_eq!(cfg.sources.reference_currency, "RUB");
        assert_eq!(cfg.sink.key_prefix, "crypto:history");
        assert!(!cfg.debug_log());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let cfg: Config = serde_json::from_str(
            r#"{
                "collection": { "change_concurrency": 0 },
                "sink": { "redis_url": "redis://127.0.0.1/" }
            }"#,
        )
        .unwrap();

        assert!(cfg.validate().is_err());
    }

    #[test]
    fn fallback_rate_must_be_positive() {
        let cfg: Config = serde_json::from_str(
            r#"{
                "collection": { "fallback_rate": "0" },
                "sink": { "redis_url": "redis://127.0.0.1/" }
            }"#,
        )
        .unwrap();

        assert!(cfg.validate().is_err());
    }
}
