//! Job fetcher
//!
//! Reads at most one pending job from the queue per cycle.

use labelq_client::ClientError;
use labelq_core::domain::outcome::FetchOutcome;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::repository::QueueRepository;

pub struct Fetcher {
    queue: Arc<dyn QueueRepository>,
}

impl Fetcher {
    pub fn new(queue: Arc<dyn QueueRepository>) -> Self {
        Self { queue }
    }

    /// Asks the queue for the next job
    ///
    /// Failures are logged and reported as [`FetchOutcome::Failed`]; the
    /// cycle simply has no job and nothing is retried until the next one.
    pub async fn fetch(&self) -> FetchOutcome {
        match self.queue.fetch_next_job().await {
            Ok(Some(job)) => {
                info!("Received: {} (ID: {})", job.describe_address(), job.id);
                FetchOutcome::Job(job)
            }
            Ok(None) => {
                debug!("No pending job");
                FetchOutcome::NoJob
            }
            Err(e) => {
                match e.downcast_ref::<ClientError>() {
                    Some(ClientError::ApiError { status, .. }) => {
                        warn!("API returned {}", status)
                    }
                    _ => error!("Unexpected error: {:#}", e),
                }
                FetchOutcome::Failed(format!("{:#}", e))
            }
        }
    }
}
