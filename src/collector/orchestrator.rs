use std::sync::Arc;

use futures_util::future::join_all;
use log::info;
use rust_decimal::Decimal;

use crate::{
    config::Config,
    error::CollectError,
    metrics::{RuntimeMetrics, METRICS},
    schema::{CollectionResult, ConversionRate, PricePoint, Symbol, SymbolSet},
    sources::adapter::{FxSource, MarketSource},
};

use super::{
    catalog::SymbolCatalog,
    change::ChangeFetcher,
    price::PriceFetcher,
    rate::RateProvider,
};

/// Drives one collection cycle.
///
/// FLOW:
/// 1. Catalog  → active symbols (failure aborts the cycle)
/// 2. Rate     → conversion rate (never fails)
/// 3. Fan-out  → per symbol, price and day change concurrently
/// 4. Merge    → keep symbols with a price, attach change as-is
///
/// GUARANTEES:
/// - `collect()` returns only after every launched fetch settled
/// - Price and change families are independent of each other
/// - The result map is built after the join; no concurrent writers
///
pub struct CollectionOrchestrator {
    catalog: SymbolCatalog,
    rate: RateProvider,
    price: PriceFetcher,
    change: ChangeFetcher,
}

impl CollectionOrchestrator {
    pub fn new(
        catalog: SymbolCatalog,
        rate: RateProvider,
        price: PriceFetcher,
        change: ChangeFetcher,
    ) -> Self {
        Self { catalog, rate, price, change }
    }

    /// Wires all components from configuration and two sources.
    pub fn from_config(
        cfg: &Config,
        market: Arc<dyn MarketSource>,
        fx: Arc<dyn FxSource>,
    ) -> anyhow::Result<Self> {
        let fallback = ConversionRate::new(cfg.collection.fallback_rate)
            .ok_or_else(|| anyhow::anyhow!("fallback rate must be positive"))?;
        let quote = &cfg.sources.quote_currency;

        Ok(Self::new(
            SymbolCatalog::new(market.clone()),
            RateProvider::new(fx, quote, &cfg.sources.reference_currency, fallback),
            PriceFetcher::new(market.clone(), quote),
            ChangeFetcher::new(market, quote, cfg.collection.change_concurrency),
        ))
    }

    pub async fn collect(&self) -> Result<CollectionResult, CollectError> {
        let symbols = self.catalog.list_active_symbols().await?;
        let rate = self.rate.fetch_rate().await;

        // Both families are polled together; only the change
        // family competes for limiter permits.
        let prices = join_all(symbols.iter().map(|s| self.price.fetch_price(s, rate)));
        let changes = join_all(symbols.iter().map(|s| self.change.fetch_day_change(s)));
        let (prices, changes) = tokio::join!(prices, changes);

        let result = merge(&symbols, prices, changes);

        let price_misses = symbols.len() - result.len();
        let change_misses = result.values().filter(|p| p.day_change_percent.is_none()).count();
        RuntimeMetrics::add(&METRICS.prices_collected, result.len());
        RuntimeMetrics::add(&METRICS.price_misses, price_misses);
        RuntimeMetrics::add(&METRICS.change_misses, change_misses);

        info!(
            "collected {}/{} symbols at rate {} ({} without day change)",
            result.len(),
            symbols.len(),
            rate,
            change_misses
        );
        Ok(result)
    }
}

/// Zips per-symbol outcomes back onto the (sorted) symbol set.
///
/// Symbols without a price are dropped; change is attached even
/// when absent.
fn merge(
    symbols: &SymbolSet,
    prices: Vec<Option<Decimal>>,
    changes: Vec<Option<Decimal>>,
) -> CollectionResult {
    symbols
        .iter()
        .zip(prices)
        .zip(changes)
        .filter_map(|((symbol, price), change)| {
            let price = price?;
            Some((symbol.clone(), point(symbol, price, change)))
        })
        .collect()
}

fn point(symbol: &Symbol, price: Decimal, day_change_percent: Option<Decimal>) -> PricePoint {
    PricePoint {
        symbol: symbol.clone(),
        price,
        day_change_percent,
    }
}
