use std::sync::Arc;

use log::{debug, warn};

use crate::{
    error::FetchMiss,
    metrics::{RuntimeMetrics, METRICS},
    schema::ConversionRate,
    sources::adapter::FxSource,
    util,
};

/// Provides the quote → reference currency conversion rate.
///
/// POLICY:
/// - Degrade, never fail: any network error, non-2xx status,
///   missing field or non-positive value yields the configured
///   fallback rate instead of an error.
/// - One FX request per call; bounded by the client timeout.
///
pub struct RateProvider {
    fx: Arc<dyn FxSource>,
    source_currency: String,
    reference_currency: String,
    fallback: ConversionRate,
}

impl RateProvider {
    pub fn new(
        fx: Arc<dyn FxSource>,
        source_currency: &str,
        reference_currency: &str,
        fallback: ConversionRate,
    ) -> Self {
        Self {
            fx,
            source_currency: source_currency.trim().to_uppercase(),
            reference_currency: reference_currency.trim().to_uppercase(),
            fallback,
        }
    }

    /// Returns the current rate, or the fallback constant.
    pub async fn fetch_rate(&self) -> ConversionRate {
        match self.try_fetch_rate().await {
            Ok(rate) => {
                debug!(
                    "{}/{} rate = {}",
                    self.source_currency, self.reference_currency, rate
                );
                rate
            }
            Err(e) => {
                warn!(
                    "{}/{} rate unavailable ({}), using fallback {}",
                    self.source_currency, self.reference_currency, e, self.fallback
                );
                RuntimeMetrics::incr(&METRICS.rate_fallbacks);
                self.fallback
            }
        }
    }

    async fn try_fetch_rate(&self) -> Result<ConversionRate, FetchMiss> {
        let payload = self.fx.latest_rates(&self.source_currency).await?;

        let raw = payload
            .get("rates")
            .and_then(|rates| rates.get(&self.reference_currency))
            .ok_or(FetchMiss::MissingField("rates"))?;

        let value = util::decimal_from_json(raw).ok_or(FetchMiss::InvalidNumber("rates"))?;
        ConversionRate::new(value).ok_or(FetchMiss::NonPositive)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::*;
    use crate::collector::fakes::FakeFx;

    fn provider(fx: FakeFx) -> RateProvider {
        RateProvider::new(
            Arc::new(fx),
            "USD",
            "RUB",
            ConversionRate::new(Decimal::from(90)).unwrap(),
        )
    }

    #[tokio::test]
    async fn reads_reference_currency_from_rates() {
        let rate = provider(FakeFx::rub(92.5)).fetch_rate().await;
        assert_eq!(rate.value(), Decimal::new(925, 1));
    }

    #[tokio::test]
    async fn endpoint_failure_returns_exact_fallback() {
        let rate = provider(FakeFx::down()).fetch_rate().await;
        assert_eq!(rate.value(), Decimal::from(90));
    }

    #[tokio::test]
    async fn missing_or_bad_field_returns_fallback() {
        let missing = FakeFx { payload: Some(json!({ "rates": { "EUR": 0.9 } })) };
        assert_eq!(provider(missing).fetch_rate().await.value(), Decimal::from(90));

        let no_rates = FakeFx { payload: Some(json!({ "result": "error" })) };
        assert_eq!(provider(no_rates).fetch_rate().await.value(), Decimal::from(90));

        let zero = FakeFx { payload: Some(json!({ "rates": { "RUB": 0 } })) };
        assert_eq!(provider(zero).fetch_rate().await.value(), Decimal::from(90));

        let text = FakeFx { payload: Some(json!({ "rates": { "RUB": "n/a" } })) };
        assert_eq!(provider(text).fetch_rate().await.value(), Decimal::from(90));
    }
}
