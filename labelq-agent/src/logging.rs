//! Logging setup
//!
//! Every event goes to stderr and to an append-only log file. File lines
//! carry a local `[dd/mm/YYYY HH:MM:SS]` stamp followed by the message, with
//! no colour codes, so operators can read the file in any editor.

use anyhow::{Context, Result};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing::Subscriber;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{Layer, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

const DEFAULT_FILTER: &str = "labelq_agent=info,labelq_client=info";

/// Local wall-clock stamp used in the log file
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStamp;

impl FormatTime for LocalStamp {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "[{}]", chrono::Local::now().format("%d/%m/%Y %H:%M:%S"))
    }
}

/// Installs the global subscriber
///
/// Creates the log directory when it is missing. Failing to create it or
/// to open the log file is fatal for the agent.
pub fn init(config: &Config) -> Result<()> {
    let file = open_log_file(&config.log_dir)?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer(file))
        .try_init()
        .context("Failed to install log subscriber")?;

    Ok(())
}

/// Opens `agent.log` for appending, creating its directory first
pub fn open_log_file(dir: &Path) -> Result<File> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let path = dir.join(crate::config::LOG_FILE_NAME);
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))
}

/// Plain-text layer writing to the log file
pub fn file_layer<S>(file: File) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    tracing_subscriber::fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_timer(LocalStamp)
        .with_level(false)
        .with_target(false)
}


#[cfg(test)]
mod tests {
    use super::*;
    use tracing::info;

    #[test]
    fn test_creates_missing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("logs");

        open_log_file(&dir).unwrap();
        assert!(dir.join(crate::config::LOG_FILE_NAME).exists());
    }

    #[test]
    fn test_uncreatable_directory_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();

        let err = open_log_file(&blocker.join("logs")).unwrap_err();
        assert!(err.to_string().contains("Failed to create log directory"));
    }

    #[test]
    fn test_file_lines_are_stamped_and_appended() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(crate::config::LOG_FILE_NAME);
        std::fs::write(&path, "earlier line\n").unwrap();

        let file = open_log_file(tmp.path()).unwrap();
        let subscriber = tracing_subscriber::registry().with(file_layer(file));
        tracing::subscriber::with_default(subscriber, || {
            info!("Received: A-12 (ID: 42)");
            info!("Empty ZPL payload");
        });

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "earlier line");

        let line = lines[1];
        assert!(line.starts_with('['));
        assert_eq!(&line[3..4], "/");
        assert_eq!(&line[6..7], "/");
        assert_eq!(&line[20..21], "]");
        assert!(line.ends_with("] Received: A-12 (ID: 42)"));
        assert!(!line.contains('\u{1b}'));
        assert!(lines[2].ends_with("] Empty ZPL payload"));
    }
}
