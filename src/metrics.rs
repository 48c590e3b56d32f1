use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::info;
use once_cell::sync::Lazy;

/// Global runtime metrics for the collector.
///
/// Purpose:
/// - Track cycle outcomes (started / succeeded / failed / coalesced)
/// - Track per-symbol fetch outcomes
/// - Track persistence throughput
///
/// Design:
/// - Lock-free (Atomics)
/// - Cheap to update
/// - Safe in async + multithreaded contexts
#[derive(Default)]
pub struct RuntimeMetrics {
    // Cycles
    pub cycles_started: AtomicUsize,
    pub cycles_succeeded: AtomicUsize,
    pub cycles_failed: AtomicUsize,
    pub ticks_coalesced: AtomicUsize,

    // Fetches
    pub prices_collected: AtomicUsize,
    pub price_misses: AtomicUsize,
    pub change_misses: AtomicUsize,
    pub rate_fallbacks: AtomicUsize,

    // Persistence
    pub rows_persisted: AtomicUsize,
    pub persist_errors: AtomicUsize,
}

impl RuntimeMetrics {
    pub fn incr(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add(counter: &AtomicUsize, n: usize) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    /// One-line snapshot for the periodic reporter.
    pub fn summary(&self) -> String {
        format!(
            "cycles={} ok={} failed={} coalesced={} prices={} price_miss={} change_miss={} rate_fallback={} persisted={} persist_err={}",
            self.cycles_started.load(Ordering::Relaxed),
            self.cycles_succeeded.load(Ordering::Relaxed),
            self.cycles_failed.load(Ordering::Relaxed),
            self.ticks_coalesced.load(Ordering::Relaxed),
            self.prices_collected.load(Ordering::Relaxed),
            self.price_misses.load(Ordering::Relaxed),
            self.change_misses.load(Ordering::Relaxed),
            self.rate_fallbacks.load(Ordering::Relaxed),
            self.rows_persisted.load(Ordering::Relaxed),
            self.persist_errors.load(Ordering::Relaxed),
        )
    }
}

/// Global metrics registry (singleton)
pub static METRICS: Lazy<Arc<RuntimeMetrics>> =
    Lazy::new(|| Arc::new(RuntimeMetrics::default()));

/// Starts the periodic metrics reporter (low-noise, one line).
pub fn spawn_reporter(period: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(period).await;
            info!("[METRICS] {}", METRICS.summary());
        }
    })
}
