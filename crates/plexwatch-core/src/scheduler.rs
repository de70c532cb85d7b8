use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::ConfigValidationError;
use crate::dispatch::{DispatchMode, DispatchOutcome, ScanDispatcher};
use crate::error::Result;
use crate::queue::ScanQueue;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub dispatched: usize,
    pub deferred: usize,
}

/// Periodically flushes the scan queue to the media server.
pub struct ScanScheduler {
    queue: Arc<ScanQueue>,
    dispatcher: Arc<ScanDispatcher>,
    interval: Duration,
}

impl ScanScheduler {
    pub fn new(
        queue: Arc<ScanQueue>,
        dispatcher: Arc<ScanDispatcher>,
        interval: Duration,
    ) -> Result<Self> {
        if interval.is_zero() {
            return Err(ConfigValidationError::MissingInterval.into());
        }
        Ok(Self {
            queue,
            dispatcher,
            interval,
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Dispatches the requests pending at the start of the tick. Busy
    /// sections go back to the tail of the queue for the next tick.
    pub async fn run_tick(&self) -> Result<TickReport> {
        let mut report = TickReport::default();
        for request in self.queue.drain_snapshot() {
            let outcome = self
                .dispatcher
                .dispatch(&request.section_title, &request.subpath, DispatchMode::Daemon)
                .await?;
            match outcome {
                DispatchOutcome::Dispatched => report.dispatched += 1,
                DispatchOutcome::Busy => {
                    report.deferred += 1;
                    self.queue.enqueue(request);
                }
            }
        }
        Ok(report)
    }

    pub async fn run(&self, cancel: CancellationToken) -> Result<()> {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately.
        ticker.tick().await;

        info!(
            "Scan scheduler started with interval of {} seconds",
            self.interval.as_secs()
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Scan scheduler stopping");
                    return Ok(());
                }
                _ = ticker.tick() => {}
            }

            let report = self.run_tick().await?;
            if report.dispatched > 0 || report.deferred > 0 {
                debug!(
                    "Scan tick: {} dispatched, {} deferred",
                    report.dispatched, report.deferred
                );
            }
        }
    }

    pub fn spawn(self: Arc<Self>, cancel: CancellationToken) -> JoinHandle<Result<()>> {
        tokio::spawn(async move { self.run(cancel).await })
    }
}
