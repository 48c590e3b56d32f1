/// Collector module
///
/// This module groups all logic responsible for one collection cycle
/// and for running cycles periodically:
/// - rate:         quote → reference currency conversion rate
/// - catalog:      discovery of active symbols
/// - price:        spot price per symbol (ungated)
/// - change:       24h change per symbol (gated by a shared limiter)
/// - orchestrator: catalog → rate → fan-out → merge
/// - scheduler:    interval loop, coalescing, persistence forwarding
///
/// Design notes:
/// - Provider-specific HTTP details MUST NOT live here; components
///   only see the `MarketSource` / `FxSource` traits
/// - Per-symbol misses are absorbed at the fetch boundary
pub mod catalog;
pub mod change;
pub mod orchestrator;
pub mod price;
pub mod rate;
pub mod scheduler;

#[cfg(test)]
pub(crate) mod fakes;
