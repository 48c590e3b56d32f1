use std::sync::Arc;

use log::debug;
use rust_decimal::Decimal;

use crate::{
    error::FetchMiss,
    schema::{ConversionRate, Symbol},
    sources::adapter::MarketSource,
    util,
};

/// Fetches the spot price of one symbol and converts it into the
/// reference currency.
///
/// Ungated: spot requests run fully concurrent.
///
/// GUARANTEES:
/// - A failed fetch yields `None` and never affects other symbols
/// - A returned price is strictly positive
///
pub struct PriceFetcher {
    market: Arc<dyn MarketSource>,
    quote_currency: String,
}

impl PriceFetcher {
    pub fn new(market: Arc<dyn MarketSource>, quote_currency: &str) -> Self {
        Self {
            market,
            quote_currency: quote_currency.trim().to_uppercase(),
        }
    }

    /// Spot price × `rate`, or `None` if the spot price is unavailable.
    ///
    /// `ConversionRate` cannot hold a value <= 0, so the rate
    /// precondition is enforced by construction.
    pub async fn fetch_price(&self, symbol: &Symbol, rate: ConversionRate) -> Option<Decimal> {
        match self.try_fetch_price(symbol, rate).await {
            Ok(price) => Some(price),
            Err(e) => {
                debug!("{} price miss: {}", symbol, e);
                None
            }
        }
    }

    /// Spot price converted into the reference currency.
    async fn try_fetch_price(
        &self,
        symbol: &Symbol,
        rate: ConversionRate,
    ) -> Result<Decimal, FetchMiss> {
        let pair = symbol.pair(&self.quote_currency);
        let payload = self.market.spot_price(&pair).await?;

        let raw = util::lookup(&payload, &["data", "amount"])
            .ok_or(FetchMiss::MissingField("data.amount"))?;
        let amount = util::decimal_from_json(raw).ok_or(FetchMiss::InvalidNumber("data.amount"))?;

        if amount <= Decimal::ZERO {
            return Err(FetchMiss::NonPositive);
        }
        rate.convert(amount).ok_or(FetchMiss::Overflow)
    }
}
