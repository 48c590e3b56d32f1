// ------------------------------------------------------------
// Module declarations
// ------------------------------------------------------------
//
// - config:    Configuration structs loaded from JSON
// - schema:    Symbol, rate, price point and persisted row types
// - error:     Typed errors for sources, cycles and sinks
// - util:      Shared helpers (decimal parsing, JSON lookup)
// - metrics:   Lock-free runtime counters + periodic reporter
// - sources:   Upstream REST adapters (market data, FX)
// - collector: Collection cycle components and the scheduler
// - sink:      Persistence sinks (Redis, demo)
//
mod collector;
mod config;
mod error;
mod metrics;
mod schema;
mod sink;
mod sources;
mod util;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use log::{info, warn};

use collector::{orchestrator::CollectionOrchestrator, scheduler::CollectionScheduler};
use config::Config;
use sink::{demo::DemoSink, redis::RedisSink, PriceSink};
use sources::{exchangerate::ExchangeRateSource, get_market_source};

// ------------------------------------------------------------
// Application entry point
// ------------------------------------------------------------
//
// Responsibilities:
// - Load configuration and initialise logging
// - Build sources, sink, orchestrator and scheduler once
// - Run the scheduler until Ctrl-C
//
// The runtime is single-threaded: every fetch is non-blocking I/O
// and the only shared state is the change limiter.
//
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.json".to_string());
    let config = Config::load(&config_path)?;

    let default_filter = if config.debug_log() { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    // Must happen before the first HTTPS client is built.
    sources::install_crypto_provider();

    let market = get_market_source(&config.sources)
        .context("building market source client")?
        .with_context(|| format!("market source '{}' is not supported", config.sources.market))?;
    let fx = Arc::new(ExchangeRateSource::new(&config.sources).context("building FX client")?);

    let sink: Arc<dyn PriceSink> = if config.sink.demo.unwrap_or(false) {
        warn!("sink running in DEMO mode, nothing will be stored");
        Arc::new(DemoSink)
    } else {
        Arc::new(
            RedisSink::connect(&config.sink.redis_url, &config.sink.key_prefix)
                .await
                .context("connecting to redis")?,
        )
    };

    let orchestrator = Arc::new(CollectionOrchestrator::from_config(&config, market, fx)?);
    let scheduler = Arc::new(CollectionScheduler::new(
        orchestrator,
        sink,
        config.collection.interval(),
    ));

    let reporter = metrics::spawn_reporter(Duration::from_secs(config.metrics_interval_secs.max(1)));
    let handle = scheduler.start();

    tokio::signal::ctrl_c().await.context("waiting for shutdown signal")?;
    info!("shutdown requested, waiting for the current cycle");

    handle.stop().await;
    reporter.abort();
    info!("[METRICS] {}", metrics::METRICS.summary());

    Ok(())
}
