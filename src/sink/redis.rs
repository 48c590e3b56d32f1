use log::info;
use redis::{aio::MultiplexedConnection, AsyncCommands};
use rust_decimal::Decimal;

use crate::{
    error::SinkError,
    schema::{Observation, Symbol},
};

use super::PriceSink;

/// Redis-backed history store.
///
/// LAYOUT:
/// - One list per symbol: `{prefix}:{SYMBOL}`
/// - Each element is a JSON `Observation`
/// - RPUSH only, so every list is chronological and append-only
///
/// The multiplexed connection is cheap to clone and reconnects
/// are handled by the redis crate.
pub struct RedisSink {
    conn: MultiplexedConnection,
    prefix: String,
}

impl RedisSink {
    pub async fn connect(url: &str, prefix: &str) -> Result<Self, SinkError> {
        let client = redis::Client::open(url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        info!("connected to redis history store");
        Ok(Self {
            conn,
            prefix: prefix.trim_end_matches(':').to_string(),
        })
    }

    fn key(&self, symbol: &Symbol) -> String {
        history_key(&self.prefix, symbol)
    }
}

fn history_key(prefix: &str, symbol: &Symbol) -> String {
    format!("{}:{}", prefix, symbol)
}

#[async_trait::async_trait]
impl PriceSink for RedisSink {
    async fn record(
        &self,
        symbol: &Symbol,
        price: Decimal,
        day_change: Option<Decimal>,
    ) -> Result<(), SinkError> {
        let row = Observation::new(symbol, price, day_change);
        let payload = serde_json::to_string(&row)?;

        let mut conn = self.conn.clone();
        let _len: i64 = conn.rpush(self.key(symbol), payload).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_keys_are_per_symbol() {
        let btc = Symbol::new("btc").unwrap();
        assert_eq!(history_key("crypto:history", &btc), "crypto:history:BTC");
    }
}
