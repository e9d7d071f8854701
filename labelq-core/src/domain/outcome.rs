//! Step outcomes of a delivery cycle
//!
//! Each step reports a tagged outcome instead of failing: the delivery loop
//! inspects these values to decide what happens next and never unwinds.

use super::job::{Job, JobId};

/// Result of asking the queue service for the next job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Job(Job),
    /// 204, an empty body, or an empty JSON value
    NoJob,
    /// Network failure, timeout, unexpected status or undecodable body
    Failed(String),
}

/// Result of submitting a job to the print spooler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Printed,
    /// Nothing to print; the spooler was never touched
    Skipped,
    Failed(String),
}

/// Result of asking the queue service to drop a printed job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AckOutcome {
    Confirmed,
    /// The service answered with something other than 200
    NotDeleted { status: u16 },
    RequestFailed(String),
}

impl AckOutcome {
    /// Whether the job may still be in the queue and print again
    pub fn duplicate_risk(&self) -> bool {
        !matches!(self, Self::Confirmed)
    }
}

/// What one fetch/dispatch/acknowledge pass did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    Idle,
    FetchFailed(String),
    EmptyPayload(JobId),
    DispatchFailed { id: JobId, reason: String },
    Delivered { id: JobId, ack: AckOutcome },
}

impl CycleOutcome {
    pub fn job_id(&self) -> Option<&JobId> {
        match self {
            Self::Idle | Self::FetchFailed(_) => None,
            Self::EmptyPayload(id) => Some(id),
            Self::DispatchFailed { id, .. } => Some(id),
            Self::Delivered { id, .. } => Some(id),
        }
    }

    /// Whether a label left for the printer during this cycle
    pub fn printed(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }
}
