use log::info;
use rust_decimal::Decimal;

use crate::{
    error::SinkError,
    schema::{Observation, Symbol},
};

use super::PriceSink;

/// Demo sink: nothing is stored, every row is logged.
///
/// Used for local runs without a Redis instance.
pub struct DemoSink;

#[async_trait::async_trait]
impl PriceSink for DemoSink {
    async fn record(
        &self,
        symbol: &Symbol,
        price: Decimal,
        day_change: Option<Decimal>,
    ) -> Result<(), SinkError> {
        let row = Observation::new(symbol, price, day_change);
        info!("DEMO -> {}", serde_json::to_string(&row)?);
        Ok(())
    }
}
