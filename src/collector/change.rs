use std::sync::Arc;

use log::debug;
use rust_decimal::Decimal;
use tokio::sync::Semaphore;

use crate::{
    error::FetchMiss,
    schema::Symbol,
    sources::adapter::MarketSource,
    util,
};

/// Default ceiling for concurrent 24h stats requests.
pub const DEFAULT_CHANGE_CONCURRENCY: usize = 4;

/// Fetches the 24h percentage change of one symbol.
///
/// Every request holds a permit from a shared counting semaphore,
/// so at most `capacity` stats requests are in flight at once no
/// matter how many symbols are being collected. The stats endpoint
/// throttles well before the spot endpoint does; without the cap a
/// large symbol set turns into a wall of 429s.
///
/// The permit is scoped to the request and released on every exit
/// path (success, miss, or the future being dropped).
///
pub struct ChangeFetcher {
    market: Arc<dyn MarketSource>,
    quote_currency: String,
    limiter: Arc<Semaphore>,
}

impl ChangeFetcher {
    pub fn new(market: Arc<dyn MarketSource>, quote_currency: &str, capacity: usize) -> Self {
        Self {
            market,
            quote_currency: quote_currency.trim().to_uppercase(),
            limiter: Arc::new(Semaphore::new(capacity.max(1))),
        }
    }

    /// `(last - open) / open * 100`, or `None` when unavailable.
    pub async fn fetch_day_change(&self, symbol: &Symbol) -> Option<Decimal> {
        match self.try_fetch_day_change(symbol).await {
            Ok(change) => Some(change),
            Err(e) => {
                debug!("{} day change miss: {}", symbol, e);
                None
            }
        }
    }

    async fn try_fetch_day_change(&self, symbol: &Symbol) -> Result<Decimal, FetchMiss> {
        let _permit = self
            .limiter
            .acquire()
            .await
            .map_err(|_| FetchMiss::LimiterClosed)?;

        let pair = symbol.pair(&self.quote_currency);
        let payload = self.market.day_stats(&pair).await?;

        let open = field(&payload, "open")?;
        let last = field(&payload, "last")?;
        percent_change(open, last)
    }
}

fn field(payload: &serde_json::Value, name: &'static str) -> Result<Decimal, FetchMiss> {
    let raw = payload.get(name).ok_or(FetchMiss::MissingField(name))?;
    util::decimal_from_json(raw).ok_or(FetchMiss::InvalidNumber(name))
}

fn percent_change(open: Decimal, last: Decimal) -> Result<Decimal, FetchMiss> {
    if open.is_zero() {
        return Err(FetchMiss::ZeroOpen);
    }
    (last - open)
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|scaled| scaled.checked_div(open))
        .ok_or(FetchMiss::InvalidNumber("open"))
}
