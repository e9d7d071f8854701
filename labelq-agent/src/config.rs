//! Agent configuration
//!
//! Defines every setting the agent runs with: queue service location,
//! printer, poll interval, request timeouts and the log location.
//! The configuration is built once at startup and passed explicitly to
//! each component; nothing reads it from global state afterwards.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Printer name the agent prints to unless overridden
pub const DEFAULT_PRINTER: &str = "EtqEmbalagem";

/// Queue service the agent polls unless overridden
pub const DEFAULT_QUEUE_URL: &str = "http://168.190.90.2:5000";

/// Log file name inside the log directory
pub const LOG_FILE_NAME: &str = "agent.log";

/// How raw print data reaches the device
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpoolerBackend {
    /// Submit through the CUPS `lp` command in raw mode
    Cups,
    /// Write straight to a device node or printer share
    Device(PathBuf),
}

/// Agent configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Queue service base URL (e.g., "http://localhost:5000")
    pub queue_url: String,

    /// Name of the local printer queue
    pub printer_name: String,

    /// Pause between the end of one cycle and the start of the next
    pub poll_interval: Duration,

    /// Bound on the job fetch request
    pub fetch_timeout: Duration,

    /// Bound on the confirmation (delete) request
    pub confirm_timeout: Duration,

    /// Directory holding the append-only log file
    pub log_dir: PathBuf,

    pub spooler: SpoolerBackend,
}

impl Config {
    /// Creates a configuration with the deployed defaults
    pub fn new(queue_url: String, printer_name: String) -> Self {
        Self {
            queue_url,
            printer_name,
            poll_interval: Duration::from_secs(2),
            fetch_timeout: labelq_client::DEFAULT_FETCH_TIMEOUT,
            confirm_timeout: labelq_client::DEFAULT_CONFIRM_TIMEOUT,
            log_dir: default_log_dir(),
            spooler: SpoolerBackend::Cups,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Every variable is optional and overrides the matching default:
    /// - LABELQ_QUEUE_URL
    /// - LABELQ_PRINTER
    /// - LABELQ_POLL_INTERVAL (seconds, default: 2)
    /// - LABELQ_FETCH_TIMEOUT (seconds, default: 10)
    /// - LABELQ_CONFIRM_TIMEOUT (seconds, default: 5)
    /// - LABELQ_LOG_DIR
    /// - LABELQ_SPOOLER (`cups` or `device`, default: cups)
    /// - LABELQ_DEVICE_PATH (required when LABELQ_SPOOLER=device)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(url) = lookup("LABELQ_QUEUE_URL") {
            config.queue_url = url;
        }

        if let Some(printer) = lookup("LABELQ_PRINTER") {
            config.printer_name = printer;
        }

        if let Some(dir) = lookup("LABELQ_LOG_DIR") {
            config.log_dir = PathBuf::from(dir);
        }

        if let Some(interval) = seconds(&lookup, "LABELQ_POLL_INTERVAL")? {
            config.poll_interval = interval;
        }

        if let Some(timeout) = seconds(&lookup, "LABELQ_FETCH_TIMEOUT")? {
            config.fetch_timeout = timeout;
        }

        if let Some(timeout) = seconds(&lookup, "LABELQ_CONFIRM_TIMEOUT")? {
            config.confirm_timeout = timeout;
        }

        let device_path = lookup("LABELQ_DEVICE_PATH").map(PathBuf::from);
        config.spooler = match lookup("LABELQ_SPOOLER").as_deref() {
            None | Some("cups") => SpoolerBackend::Cups,
            Some("device") => SpoolerBackend::Device(
                device_path.context("LABELQ_SPOOLER=device requires LABELQ_DEVICE_PATH")?,
            ),
            Some(other) => anyhow::bail!("unknown spooler backend '{}'", other),
        };

        Ok(config)
    }

    /// Path of the append-only log file
    pub fn log_file(&self) -> PathBuf {
        self.log_dir.join(LOG_FILE_NAME)
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.printer_name.trim().is_empty() {
            anyhow::bail!("printer_name cannot be empty");
        }

        if self.queue_url.is_empty() {
            anyhow::bail!("queue_url cannot be empty");
        }

        if !self.queue_url.starts_with("http://") && !self.queue_url.starts_with("https://") {
            anyhow::bail!("queue_url must start with http:// or https://");
        }

        if self.poll_interval.is_zero() {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if self.fetch_timeout.is_zero() || self.confirm_timeout.is_zero() {
            anyhow::bail!("request timeouts must be greater than 0");
        }

        if self.log_dir.as_os_str().is_empty() {
            anyhow::bail!("log_dir cannot be empty");
        }

        if let SpoolerBackend::Device(path) = &self.spooler {
            if path.as_os_str().is_empty() {
                anyhow::bail!("device path cannot be empty");
            }
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_URL.to_string(), DEFAULT_PRINTER.to_string())
    }
}

fn default_log_dir() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from(r"C:\AgenteImpressao")
    } else {
        PathBuf::from("/var/log/labelq")
    }
}

fn seconds(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<Duration>> {
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .with_context(|| format!("{} must be a whole number of seconds, got '{}'", key, raw))
        })
        .transpose()
}
