use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------
// Symbol
// ------------------------------------------------------------
//
// Uppercase currency ticker ("BTC", "ETH").
//
// Value object: two symbols are the same iff their strings are.
// Construction trims and uppercases, so "  btc" and "BTC" collide.
//
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Returns `None` for empty or whitespace-only tickers.
    pub fn new(raw: &str) -> Option<Self> {
        let s = raw.trim();
        if s.is_empty() {
            return None;
        }
        Some(Self(s.to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Exchange pair for this symbol, e.g. `BTC-USD`.
    pub fn pair(&self, quote: &str) -> String {
        format!("{}-{}", self.0, quote.trim().to_uppercase())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ------------------------------------------------------------
// Conversion rate
// ------------------------------------------------------------
//
// Multiplier from the quote currency (USD) into the reference
// currency. Always strictly positive: a zero or negative rate
// cannot be constructed, so price conversion never sees one.
//
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionRate(Decimal);

impl ConversionRate {
    pub fn new(value: Decimal) -> Option<Self> {
        (value > Decimal::ZERO).then_some(Self(value))
    }

    pub fn value(self) -> Decimal {
        self.0
    }

    /// `None` when the product does not fit in a `Decimal`.
    pub fn convert(self, amount: Decimal) -> Option<Decimal> {
        amount.checked_mul(self.0)
    }
}

impl fmt::Display for ConversionRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.value(), f)
    }
}

// ------------------------------------------------------------
// Price point
// ------------------------------------------------------------
//
// One symbol's observation for one collection cycle.
//
// `day_change_percent`:
// - `None` means the 24h stats were unavailable
// - `Some(0)` means the price did not move
// These are different and must stay different downstream.
//
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PricePoint {
    pub symbol: Symbol,

    /// Price in the reference currency, always > 0
    pub price: Decimal,

    /// 24h change in percent (1.5 == +1.5%)
    pub day_change_percent: Option<Decimal>,
}

/// Result of one `collect()` call, keyed by symbol.
///
/// Only symbols with a successfully fetched price are present.
pub type CollectionResult = BTreeMap<Symbol, PricePoint>;

/// Universe of tradable symbols, sorted and deduplicated.
pub type SymbolSet = BTreeSet<Symbol>;

// ------------------------------------------------------------
// Observation (persisted row)
// ------------------------------------------------------------
//
// Append-only history row written by a sink. Field names match
// the rows the history query service reads (`name`, `dynamic`).
//
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Ticker symbol
    pub name: String,

    /// Price in the reference currency
    pub price: Decimal,

    /// 24h change in percent, absent when unknown
    pub dynamic: Option<Decimal>,

    /// Assigned by the sink at write time
    pub created_at: DateTime<Utc>,
}

impl Observation {
    pub fn new(symbol: &Symbol, price: Decimal, dynamic: Option<Decimal>) -> Self {
        Self {
            name: symbol.as_str().to_string(),
            price,
            dynamic,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_is_trimmed_and_uppercased() {
        assert_eq!(Symbol::new("  btc ").unwrap().as_str(), "BTC");
        assert!(Symbol::new("   ").is_none());
        assert_eq!(Symbol::new("eth").unwrap().pair("usd"), "ETH-USD");
    }

    #[test]
    fn conversion_rate_rejects_non_positive_values() {
        assert!(ConversionRate::new(Decimal::ZERO).is_none());
        assert!(ConversionRate::new(Decimal::from(-1)).is_none());

        let rate = ConversionRate::new(Decimal::from(90)).unwrap();
        assert_eq!(rate.convert(Decimal::from(50_000)), Some(Decimal::from(4_500_000)));
        assert_eq!(rate.convert(Decimal::MAX), None);
    }

    #[test]
    fn observation_keeps_absent_change_distinct_from_zero() {
        let btc = Symbol::new("BTC").unwrap();
        let absent = Observation::new(&btc, Decimal::ONE, None);
        let flat = Observation::new(&btc, Decimal::ONE, Some(Decimal::ZERO));

        let absent_json = serde_json::to_value(&absent).unwrap();
        let flat_json = serde_json::to_value(&flat).unwrap();

        assert!(absent_json["dynamic"].is_null());
        assert_eq!(flat_json["dynamic"], "0");
    }
}
