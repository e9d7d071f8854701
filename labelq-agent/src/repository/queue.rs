//! Queue repository
//!
//! Handles communication with the queue service:
//! - Fetching the next pending job
//! - Confirming a printed job so it is removed from the queue

use anyhow::{Context, Result};
use async_trait::async_trait;
use labelq_client::QueueClient;
use labelq_core::domain::job::{Job, JobId};

/// Repository trait for the remote job queue
#[async_trait]
pub trait QueueRepository: Send + Sync {
    /// Fetches at most one pending job
    ///
    /// `Ok(None)` means the queue reported nothing to print.
    async fn fetch_next_job(&self) -> Result<Option<Job>>;

    /// Asks the queue to drop a job that has been printed
    ///
    /// Errors keep their [`labelq_client::ClientError`] so callers can tell
    /// a refused deletion (status) from a failed request.
    async fn confirm_job(&self, id: &JobId) -> Result<()>;
}

#[async_trait]
impl QueueRepository for QueueClient {
    async fn fetch_next_job(&self) -> Result<Option<Job>> {
        QueueClient::fetch_next_job(self)
            .await
            .context("Failed to fetch next job")
    }

    async fn confirm_job(&self, id: &JobId) -> Result<()> {
        QueueClient::confirm_job(self, id)
            .await
            .with_context(|| format!("Failed to confirm job {}", id))
    }
}
