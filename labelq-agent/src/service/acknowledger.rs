//! Acknowledger
//!
//! Tells the queue a printed job can be removed. There is no retry: if the
//! confirmation does not go through, the job stays queued and will be
//! fetched and printed again, so every failure is logged as a duplicate risk.

use labelq_client::ClientError;
use labelq_core::domain::job::JobId;
use labelq_core::domain::outcome::AckOutcome;
use std::sync::Arc;
use tracing::{info, warn};

use crate::repository::QueueRepository;

pub struct Acknowledger {
    queue: Arc<dyn QueueRepository>,
}

impl Acknowledger {
    pub fn new(queue: Arc<dyn QueueRepository>) -> Self {
        Self { queue }
    }

    /// Sends one deletion request for `id`
    pub async fn acknowledge(&self, id: &JobId) -> AckOutcome {
        match self.queue.confirm_job(id).await {
            Ok(()) => {
                info!("ID {} removed from the server queue", id);
                AckOutcome::Confirmed
            }
            Err(e) => match e.downcast_ref::<ClientError>() {
                Some(ClientError::ApiError { status, .. }) => {
                    warn!(
                        "Server did not delete {} (status {}), it may print again",
                        id, status
                    );
                    AckOutcome::NotDeleted { status: *status }
                }
                _ => {
                    warn!(
                        "Error confirming deletion of {}, it may print again: {:#}",
                        id, e
                    );
                    AckOutcome::RequestFailed(format!("{:#}", e))
                }
            },
        }
    }
}
