use std::sync::Arc;

use log::{debug, info};
use serde_json::Value;

use crate::{
    error::CollectError,
    schema::{Symbol, SymbolSet},
    sources::adapter::MarketSource,
};

/// Status value marking a product as tradable (exact, case-sensitive).
const ONLINE: &str = "online";

/// Discovers the universe of tradable symbols.
///
/// Failure here is fatal to the cycle: without a symbol list
/// there is nothing to collect.
pub struct SymbolCatalog {
    market: Arc<dyn MarketSource>,
}

impl SymbolCatalog {
    pub fn new(market: Arc<dyn MarketSource>) -> Self {
        Self { market }
    }

    /// Base currencies of all products with status "online",
    /// deduplicated and sorted.
    pub async fn list_active_symbols(&self) -> Result<SymbolSet, CollectError> {
        let payload = self
            .market
            .list_products()
            .await
            .map_err(|e| CollectError::CatalogUnavailable(e.to_string()))?;

        let symbols = active_symbols(&payload)?;
        info!(
            "{} catalog: {} active symbols",
            self.market.name(),
            symbols.len()
        );
        Ok(symbols)
    }
}

/// Extracts active base currencies from a product listing.
///
/// The listing itself must be a JSON array. Individual entries
/// without a string `status` / `base_currency` are skipped.
fn active_symbols(payload: &Value) -> Result<SymbolSet, CollectError> {
    let products = payload.as_array().ok_or_else(|| {
        CollectError::CatalogUnavailable("product listing is not a JSON array".to_string())
    })?;

    let mut symbols = SymbolSet::new();
    for product in products {
        let status = product.get("status").and_then(Value::as_str);
        let base = product.get("base_currency").and_then(Value::as_str);

        match (status, base) {
            (Some(ONLINE), Some(base)) => {
                if let Some(symbol) = Symbol::new(base) {
                    symbols.insert(symbol);
                }
            }
            (Some(_), Some(_)) => {}
            _ => debug!("skipping malformed product entry: {}", product),
        }
    }
    Ok(symbols)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::collector::fakes::FakeMarket;

    fn names(set: &SymbolSet) -> Vec<&str> {
        set.iter().map(Symbol::as_str).collect()
    }

    #[tokio::test]
    async fn keeps_online_products_sorted_and_unique() {
        let market = FakeMarket::with_products(&[
            ("ETH", "online"),
            ("BTC", "online"),
            ("XRP", "offline"),
            ("BTC", "online"),
            ("SOL", "Online"),
            ("ADA", "delisted"),
        ]);
        let catalog = SymbolCatalog::new(Arc::new(market));

        let symbols = catalog.list_active_symbols().await.unwrap();
        assert_eq!(names(&symbols), vec!["BTC", "ETH"]);
    }

    #[tokio::test]
    async fn unreachable_listing_is_catalog_unavailable() {
        let catalog = SymbolCatalog::new(Arc::new(FakeMarket::default()));

        let err = catalog.list_active_symbols().await.unwrap_err();
        assert!(matches!(err, CollectError::CatalogUnavailable(_)));
    }

    #[test]
    fn non_array_listing_is_catalog_unavailable() {
        let err = active_symbols(&json!({ "message": "maintenance" })).unwrap_err();
        assert!(matches!(err, CollectError::CatalogUnavailable(_)));
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let payload = json!([
            { "base_currency": "BTC", "status": "online" },
            { "status": "online" },
            { "base_currency": 42, "status": "online" },
            "garbage"
        ]);
        assert_eq!(names(&active_symbols(&payload).unwrap()), vec!["BTC"]);
    }
}
