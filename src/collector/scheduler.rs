use std::sync::Arc;
use std::time::Duration;

use log::{error, info, warn};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};

use crate::{
    error::CollectError,
    metrics::{RuntimeMetrics, METRICS},
    sink::PriceSink,
};

use super::orchestrator::CollectionOrchestrator;

/// Outcome of one successful cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub collected: usize,
    pub persisted: usize,
    pub failed_writes: usize,
}

/// Runs collection cycles on a fixed interval and forwards results
/// to the persistence sink.
///
/// RULES:
/// - Cycles never overlap. Ticks missed while a cycle is still
///   running collapse into a single catch-up run (coalesced), never
///   a backlog.
/// - An overrunning cycle is not cancelled; it delays the next tick.
/// - A failed cycle is logged; the loop keeps going.
/// - A failed write is logged; remaining symbols are still written.
///
pub struct CollectionScheduler {
    orchestrator: Arc<CollectionOrchestrator>,
    sink: Arc<dyn PriceSink>,
    period: Duration,
}

/// Handle to a running scheduler loop.
pub struct SchedulerHandle {
    shutdown: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Requests shutdown and waits for the loop to exit.
    ///
    /// A cycle in progress is allowed to finish first.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.join.await {
            error!("scheduler task ended abnormally: {}", e);
        }
    }
}

impl CollectionScheduler {
    pub fn new(
        orchestrator: Arc<CollectionOrchestrator>,
        sink: Arc<dyn PriceSink>,
        period: Duration,
    ) -> Self {
        Self {
            orchestrator,
            sink,
            period,
        }
    }

    /// Executes exactly one cycle inline.
    pub async fn run_once(&self) -> Result<CycleReport, CollectError> {
        RuntimeMetrics::incr(&METRICS.cycles_started);

        let result = match self.orchestrator.collect().await {
            Ok(result) => result,
            Err(e) => {
                RuntimeMetrics::incr(&METRICS.cycles_failed);
                error!("collection cycle failed: {}", e);
                return Err(e);
            }
        };

        let mut report = CycleReport {
            collected: result.len(),
            persisted: 0,
            failed_writes: 0,
        };

        for point in result.values() {
            match self
                .sink
                .record(&point.symbol, point.price, point.day_change_percent)
                .await
            {
                Ok(()) => report.persisted += 1,
                Err(e) => {
                    report.failed_writes += 1;
                    error!("failed to persist {}: {}", point.symbol, e);
                }
            }
        }

        RuntimeMetrics::add(&METRICS.rows_persisted, report.persisted);
        RuntimeMetrics::add(&METRICS.persist_errors, report.failed_writes);
        RuntimeMetrics::incr(&METRICS.cycles_succeeded);

        info!(
            "saved {} prices ({} write failures)",
            report.persisted, report.failed_writes
        );
        Ok(report)
    }

    /// Spawns the tick loop. The first cycle runs immediately.
    pub fn start(self: Arc<Self>) -> SchedulerHandle {
        let (shutdown, mut stop_rx) = watch::channel(false);

        let join = tokio::spawn(async move {
            let mut ticker = interval(self.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            info!("scheduler started (every {:?})", self.period);

            loop {
                // shutdown wins over an overdue tick
                tokio::select! {
                    biased;

                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }

                    _ = ticker.tick() => {
                        let started = Instant::now();
                        // errors are logged inside run_once
                        let _ = self.run_once().await;
                        self.note_overrun(started.elapsed());
                    }
                }
            }

            info!("scheduler stopped");
        });

        SchedulerHandle { shutdown, join }
    }

    fn note_overrun(&self, elapsed: Duration) {
        if elapsed <= self.period {
            return;
        }
        let skipped = (elapsed.as_nanos() / self.period.as_nanos().max(1)) as usize;
        RuntimeMetrics::add(&METRICS.ticks_coalesced, skipped);
        warn!(
            "cycle took {:?} (period {:?}), {} tick(s) coalesced",
            elapsed, self.period, skipped
        );
    }
}
