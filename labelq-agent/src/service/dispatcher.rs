//! Print dispatcher
//!
//! Submits one job as a single raw document to the configured printer.

use anyhow::{Context, Result};
use labelq_core::domain::job::Job;
use labelq_core::domain::outcome::DispatchOutcome;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::spooler::{DataType, PrintSpooler};

pub struct PrintDispatcher {
    spooler: Arc<dyn PrintSpooler>,
    printer: String,
}

impl PrintDispatcher {
    pub fn new(spooler: Arc<dyn PrintSpooler>, printer: impl Into<String>) -> Self {
        Self {
            spooler,
            printer: printer.into(),
        }
    }

    pub fn printer(&self) -> &str {
        &self.printer
    }

    /// Prints `job`, reporting the result instead of failing
    ///
    /// An empty payload is skipped without touching the spooler. Spooler
    /// calls are not timed: a hung print system stalls the caller.
    pub fn dispatch(&self, job: &Job) -> DispatchOutcome {
        if job.payload.is_empty() {
            warn!("Empty ZPL payload for ID {}, nothing to print", job.id);
            return DispatchOutcome::Skipped;
        }

        info!("Sending ID {} to printer '{}'", job.id, self.printer);

        match self.submit(job) {
            Ok(()) => DispatchOutcome::Printed,
            Err(e) => {
                error!("Printer error: {:#}", e);
                DispatchOutcome::Failed(format!("{:#}", e))
            }
        }
    }

    /// Runs the raw document protocol; the session closes when it drops
    fn submit(&self, job: &Job) -> Result<()> {
        let data = job
            .payload
            .to_latin1()
            .context("Payload is not single-byte printer markup")?;

        let mut session = self
            .spooler
            .open(&self.printer)
            .with_context(|| format!("Failed to open printer '{}'", self.printer))?;

        session
            .start_document(&job.document_name(), DataType::Raw)
            .context("Failed to start document")?;
        session.start_page().context("Failed to start page")?;

        let written = session.write(&data).context("Failed to write payload")?;
        if written < data.len() {
            anyhow::bail!(
                "Spooler accepted {} of {} bytes",
                written,
                data.len()
            );
        }

        session.end_page().context("Failed to end page")?;
        session.end_document().context("Failed to end document")?;

        Ok(())
    }
}
