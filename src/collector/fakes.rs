//! In-memory stand-ins for the upstream APIs and the persistence sink.
//!
//! Every fake counts calls and tracks in-flight requests so tests can
//! assert on concurrency and on "nothing left running" after a call.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use rust_decimal::Decimal;
use serde_json::{json, Value};

use crate::error::{SinkError, SourceError};
use crate::schema::{Observation, Symbol};
use crate::sink::PriceSink;
use crate::sources::adapter::{FxSource, MarketSource};

/// Tracks current and peak in-flight calls plus settled calls.
#[derive(Default)]
pub struct Gauge {
    in_flight: AtomicUsize,
    pub peak: AtomicUsize,
    pub started: AtomicUsize,
    pub settled: AtomicUsize,
}

impl Gauge {
    fn enter(&self) {
        self.started.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.settled.fetch_add(1, Ordering::SeqCst);
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn settled(&self) -> usize {
        self.settled.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub struct FakeMarket {
    /// `None` makes the listing endpoint fail with HTTP 503
    pub products: Option<Value>,
    /// pair -> spot payload; absent pairs answer 404
    pub spots: HashMap<String, Value>,
    /// pair -> stats payload; absent pairs answer 404
    pub stats: HashMap<String, Value>,
    /// pairs whose stats call fails with a transport error
    pub stats_broken: HashSet<String>,
    pub spot_delay: Duration,
    pub stats_delay: Duration,
    pub listing_calls: AtomicUsize,
    pub spot_gauge: Gauge,
    pub stats_gauge: Gauge,
}

impl FakeMarket {
    pub fn with_products(entries: &[(&str, &str)]) -> Self {
        let products = entries
            .iter()
            .map(|(base, status)| json!({ "base_currency": base, "status": status }))
            .collect::<Vec<_>>();
        Self {
            products: Some(Value::Array(products)),
            ..Self::default()
        }
    }

    pub fn spot(mut self, symbol: &str, amount: &str) -> Self {
        self.spots
            .insert(format!("{symbol}-USD"), json!({ "data": { "amount": amount } }));
        self
    }

    pub fn stats(mut self, symbol: &str, open: &str, last: &str) -> Self {
        self.stats
            .insert(format!("{symbol}-USD"), json!({ "open": open, "last": last }));
        self
    }
}

#[async_trait::async_trait]
impl MarketSource for FakeMarket {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn list_products(&self) -> Result<Value, SourceError> {
        self.listing_calls.fetch_add(1, Ordering::SeqCst);
        self.products.clone().ok_or(SourceError::Status(503))
    }

    async fn spot_price(&self, pair: &str) -> Result<Value, SourceError> {
        self.spot_gauge.enter();
        tokio::time::sleep(self.spot_delay).await;
        let out = self.spots.get(pair).cloned().ok_or(SourceError::Status(404));
        self.spot_gauge.leave();
        out
    }

    async fn day_stats(&self, pair: &str) -> Result<Value, SourceError> {
        self.stats_gauge.enter();
        tokio::time::sleep(self.stats_delay).await;
        let out = if self.stats_broken.contains(pair) {
            Err(SourceError::Transport("connection reset".to_string()))
        } else {
            self.stats.get(pair).cloned().ok_or(SourceError::Status(404))
        };
        self.stats_gauge.leave();
        out
    }
}

pub struct FakeFx {
    /// `None` makes the endpoint fail
    pub payload: Option<Value>,
}

impl FakeFx {
    pub fn rub(rate: f64) -> Self {
        Self { payload: Some(json!({ "base": "USD", "rates": { "USD": 1, "RUB": rate } })) }
    }

    pub fn down() -> Self {
        Self { payload: None }
    }
}

#[async_trait::async_trait]
impl FxSource for FakeFx {
    async fn latest_rates(&self, _base: &str) -> Result<Value, SourceError> {
        self.payload
            .clone()
            .ok_or_else(|| SourceError::Transport("dns failure".to_string()))
    }
}

/// Records every observation; optionally rejects some symbols.
#[derive(Default)]
pub struct RecordingSink {
    pub rows: Mutex<Vec<Observation>>,
    pub reject: HashSet<String>,
}

impl RecordingSink {
    pub fn rejecting(symbols: &[&str]) -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            reject: symbols.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> =
            self.rows.lock().unwrap().iter().map(|r| r.name.clone()).collect();
        names.sort();
        names
    }
}

#[async_trait::async_trait]
impl PriceSink for RecordingSink {
    async fn record(
        &self,
        symbol: &Symbol,
        price: Decimal,
        day_change: Option<Decimal>,
    ) -> Result<(), SinkError> {
        if self.reject.contains(symbol.as_str()) {
            let refused = serde_json::from_str::<Value>("refused").unwrap_err();
            return Err(SinkError::Serialize(refused));
        }
        self.rows
            .lock()
            .unwrap()
            .push(Observation::new(symbol, price, day_change));
        Ok(())
    }
}
