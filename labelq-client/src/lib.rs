//! Labelq HTTP Client
//!
//! A small, type-safe HTTP client for the label-print queue service.
//!
//! The service exposes two endpoints: one that advertises the next pending
//! job and one that removes a job once it has been printed.
//!
//! # Example
//!
//! ```no_run
//! use labelq_client::QueueClient;
//!
//! #[tokio::main]
//! async fn main() -> labelq_client::Result<()> {
//!     let client = QueueClient::new("http://localhost:5000");
//!
//!     if let Some(job) = client.fetch_next_job().await? {
//!         println!("Next label: {}", job.id);
//!         client.confirm_job(&job.id).await?;
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
mod jobs;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use labelq_core::domain::job::{Job, JobId};

use reqwest::{Client, Url};
use std::time::Duration;

/// Path that advertises the next pending job
pub const DEFAULT_FETCH_PATH: &str = "/consulta/wms/buscar_impressao";

/// Path under which printed jobs are confirmed (job id is appended)
pub const DEFAULT_CONFIRM_PATH: &str = "/consulta/wms/confirmar_impressao";

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_CONFIRM_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP client for the queue service
#[derive(Debug, Clone)]
pub struct QueueClient {
    /// Base URL of the queue service (e.g., "http://localhost:5000")
    base_url: String,
    fetch_path: String,
    confirm_path: String,
    fetch_timeout: Duration,
    confirm_timeout: Duration,
    /// HTTP client instance
    client: Client,
}

impl QueueClient {
    /// Create a new queue client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the queue service (e.g., "http://localhost:5000")
    ///
    /// # Example
    /// ```
    /// use labelq_client::QueueClient;
    ///
    /// let client = QueueClient::new("http://localhost:5000");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new queue client with a custom HTTP client
    ///
    /// This allows you to configure proxies, TLS settings, etc. Per-request
    /// timeouts set on this client still apply on top of the HTTP client's own.
    ///
    /// # Example
    /// ```
    /// use labelq_client::QueueClient;
    /// use reqwest::Client;
    ///
    /// let client = QueueClient::with_client("http://localhost:5000", Client::new());
    /// ```
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            fetch_path: DEFAULT_FETCH_PATH.to_string(),
            confirm_path: DEFAULT_CONFIRM_PATH.to_string(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            confirm_timeout: DEFAULT_CONFIRM_TIMEOUT,
            client,
        }
    }

    pub fn with_fetch_path(mut self, path: impl Into<String>) -> Self {
        self.fetch_path = normalize_path(path.into());
        self
    }

    pub fn with_confirm_path(mut self, path: impl Into<String>) -> Self {
        self.confirm_path = normalize_path(path.into());
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_confirm_timeout(mut self, timeout: Duration) -> Self {
        self.confirm_timeout = timeout;
        self
    }

    /// Get the base URL of the queue service
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL polled for pending jobs
    pub fn fetch_url(&self) -> String {
        format!("{}{}", self.base_url, self.fetch_path)
    }

    /// Full URL that confirms (deletes) a printed job
    ///
    /// The id is one opaque path segment: `/`, `?` and `#` are escaped.
    pub fn confirm_url(&self, id: &JobId) -> Result<Url> {
        let base = format!("{}{}", self.base_url, self.confirm_path);
        let mut url = Url::parse(&base)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", base, e)))?;

        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(format!("{} cannot take a job id", base)))?
            .push(id.as_str());

        Ok(url)
    }
}

fn normalize_path(path: String) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}
