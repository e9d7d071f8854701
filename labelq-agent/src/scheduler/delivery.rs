//! Delivery loop
//!
//! Fetches one job, prints it, confirms it, then sleeps a fixed interval.
//! Cycles run strictly one after another on the caller's task; the sleep
//! always completes before the next fetch starts.

use labelq_core::domain::outcome::{CycleOutcome, DispatchOutcome, FetchOutcome};
use std::future::Future;
use std::sync::Arc;
use tokio::time::{self, Duration};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::repository::QueueRepository;
use crate::service::{Acknowledger, Fetcher, PrintDispatcher};
use crate::spooler::PrintSpooler;

/// Poll/print/acknowledge loop
///
/// Delivery is at-least-once: a job whose confirmation fails stays in the
/// queue and is printed again on a later cycle.
pub struct DeliveryLoop {
    fetcher: Fetcher,
    dispatcher: PrintDispatcher,
    acknowledger: Acknowledger,
    interval: Duration,
}

impl DeliveryLoop {
    /// Creates a new delivery loop
    pub fn new(
        config: &Config,
        queue: Arc<dyn QueueRepository>,
        spooler: Arc<dyn PrintSpooler>,
    ) -> Self {
        Self {
            fetcher: Fetcher::new(Arc::clone(&queue)),
            dispatcher: PrintDispatcher::new(spooler, config.printer_name.clone()),
            acknowledger: Acknowledger::new(queue),
            interval: config.poll_interval,
        }
    }

    /// Runs forever; the process is stopped from outside
    pub async fn run(&self) {
        self.run_until(std::future::pending()).await;
    }

    /// Runs cycles until `shutdown` resolves, returning the number of cycles
    ///
    /// `shutdown` is only observed while sleeping, so a cycle that has
    /// started always finishes.
    pub async fn run_until<F>(&self, shutdown: F) -> u64
    where
        F: Future<Output = ()>,
    {
        info!(
            "Starting delivery loop (printer: '{}', interval: {:?})",
            self.dispatcher.printer(),
            self.interval
        );

        tokio::pin!(shutdown);
        let mut cycles = 0;

        loop {
            let outcome = self.run_once().await;
            cycles += 1;
            debug!("Cycle {} finished: {:?}", cycles, outcome);

            tokio::select! {
                _ = time::sleep(self.interval) => {}
                _ = &mut shutdown => {
                    info!("Delivery loop stopped after {} cycle(s)", cycles);
                    return cycles;
                }
            }
        }
    }

    /// Performs a single fetch/dispatch/acknowledge pass
    pub async fn run_once(&self) -> CycleOutcome {
        let job = match self.fetcher.fetch().await {
            FetchOutcome::Job(job) => job,
            FetchOutcome::NoJob => return CycleOutcome::Idle,
            FetchOutcome::Failed(reason) => return CycleOutcome::FetchFailed(reason),
        };

        match self.dispatcher.dispatch(&job) {
            DispatchOutcome::Skipped => CycleOutcome::EmptyPayload(job.id),
            DispatchOutcome::Failed(reason) => {
                warn!(
                    "Spooler failure, ID {} stays in the queue for another attempt",
                    job.id
                );
                CycleOutcome::DispatchFailed { id: job.id, reason }
            }
            DispatchOutcome::Printed => {
                info!(
                    "Print submitted, confirming ID {} so it leaves the queue",
                    job.id
                );
                let ack = self.acknowledger.acknowledge(&job.id).await;
                CycleOutcome::Delivered { id: job.id, ack }
            }
        }
    }
}
