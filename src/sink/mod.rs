//! Persistence sinks
//!
//! A sink durably appends one observation per call. It assigns the
//! creation timestamp itself and never updates existing rows.

pub mod demo;
pub mod redis;

use rust_decimal::Decimal;

use crate::{error::SinkError, schema::Symbol};

#[async_trait::async_trait]
pub trait PriceSink: Send + Sync {

    /// Appends one `(symbol, price, day change)` observation
    /// stamped with the current time.
    async fn record(
        &self,
        symbol: &Symbol,
        price: Decimal,
        day_change: Option<Decimal>,
    ) -> Result<(), SinkError>;
}
