//! Labelq Agent
//!
//! Bridges a network label-print queue and a local printer.
//!
//! Architecture:
//! - Configuration: Load settings from environment or defaults
//! - Logging: Console plus an append-only log file
//! - Repositories: HTTP communication with the queue service
//! - Spooler: Raw document submission to the local print system
//! - Services: Fetch, print and acknowledge steps
//! - Scheduler: Fixed-interval delivery loop
//!
//! The agent polls the queue for one job at a time, prints it as a raw
//! document, and confirms it so the queue drops it. A job whose print fails
//! is left in the queue and retried on a later cycle.

mod config;
mod logging;
mod repository;
mod scheduler;
mod service;
mod spooler;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{error, info};

use crate::config::{Config, SpoolerBackend};
use crate::scheduler::DeliveryLoop;
use labelq_client::QueueClient;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = load_config()?;

    // Nothing can be recorded without the log location, so this is fatal
    logging::init(&config)?;

    if let Err(e) = run(config).await {
        error!("Agent stopped with error: {:#}", e);
        return Err(e);
    }

    Ok(())
}

/// Loads configuration from environment variables over the built-in defaults
fn load_config() -> Result<Config> {
    let config = Config::from_env().context("Invalid configuration")?;
    config.validate()?;
    Ok(config)
}

async fn run(config: Config) -> Result<()> {
    info!(
        "Agent started (ack mode) | printer: {}",
        config.printer_name
    );
    info!(
        "Queue: {}, poll interval: {:?}, fetch timeout: {:?}, confirm timeout: {:?}",
        config.queue_url, config.poll_interval, config.fetch_timeout, config.confirm_timeout
    );
    match &config.spooler {
        SpoolerBackend::Cups => info!("Spooler: CUPS (raw)"),
        SpoolerBackend::Device(path) => info!("Spooler: device {}", path.display()),
    }
    info!("Log file: {}", config.log_file().display());

    let http = reqwest::Client::builder()
        .connect_timeout(config.fetch_timeout)
        .build()
        .context("Failed to build HTTP client")?;

    let queue = QueueClient::with_client(config.queue_url.clone(), http)
        .with_fetch_timeout(config.fetch_timeout)
        .with_confirm_timeout(config.confirm_timeout);

    info!("Queue client initialized");

    let print_spooler = Arc::from(spooler::from_backend(&config.spooler));
    let delivery = DeliveryLoop::new(&config, Arc::new(queue), print_spooler);

    delivery.run().await;

    Ok(())
}
