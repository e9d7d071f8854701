//! CUPS spooler
//!
//! Submits documents with `lp -o raw`, which hands the bytes to the printer
//! without running them through a filter. The printer is checked with
//! `lpstat -p` when opened so an unknown or disabled queue fails early.

use anyhow::{Context, Result};
use std::io::Write;
use std::process::{Child, Command, Stdio};
use tracing::{debug, warn};

use super::{DataType, PrintSpooler, PrinterSession};

/// Spooler backed by the CUPS command-line tools
#[derive(Debug, Clone)]
pub struct CupsSpooler {
    /// Command line used to query a printer (`lpstat`)
    lpstat: Vec<String>,
    /// Command line used to submit a document (`lp`)
    lp: Vec<String>,
}

impl CupsSpooler {
    pub fn new() -> Self {
        Self::with_commands(vec!["lpstat".to_string()], vec!["lp".to_string()])
    }

    /// Uses custom command lines in place of `lpstat` and `lp`
    ///
    /// Printer arguments are appended after the given words.
    pub fn with_commands(lpstat: Vec<String>, lp: Vec<String>) -> Self {
        Self { lpstat, lp }
    }
}

impl Default for CupsSpooler {
    fn default() -> Self {
        Self::new()
    }
}

fn command(words: &[String]) -> Result<Command> {
    let (program, args) = words.split_first().context("Empty spooler command")?;
    let mut cmd = Command::new(program);
    cmd.args(args);
    Ok(cmd)
}

impl PrintSpooler for CupsSpooler {
    fn open(&self, printer: &str) -> Result<Box<dyn PrinterSession>> {
        let output = command(&self.lpstat)?
            .arg("-p")
            .arg(printer)
            .output()
            .context("Failed to execute lpstat. Is CUPS installed?")?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            anyhow::bail!("Printer '{}' not available: {}", printer, stderr.trim());
        }

        if is_disabled(&stdout, printer) {
            anyhow::bail!("Printer '{}' is disabled: {}", printer, stdout.trim());
        }

        debug!("lpstat: {}", stdout.trim());

        Ok(Box::new(CupsSession {
            printer: printer.to_string(),
            lp: self.lp.clone(),
            child: None,
            page_open: false,
        }))
    }
}

/// Whether `lpstat -p` reports `printer` itself as disabled
///
/// Only the status line counts; names and descriptions may say "disabled".
fn is_disabled(lpstat: &str, printer: &str) -> bool {
    let status = format!("printer {} disabled", printer);
    lpstat.lines().any(|line| line.trim_start().starts_with(&status))
}

/// One `lp` submission; the child process is the document
struct CupsSession {
    printer: String,
    lp: Vec<String>,
    child: Option<Child>,
    page_open: bool,
}

impl CupsSession {
    fn child(&mut self) -> Result<&mut Child> {
        self.child.as_mut().context("No document started")
    }
}

impl PrinterSession for CupsSession {
    fn start_document(&mut self, name: &str, data_type: DataType) -> Result<()> {
        if self.child.is_some() {
            anyhow::bail!("A document is already open on '{}'", self.printer);
        }

        let mut cmd = command(&self.lp)?;
        cmd.arg("-d").arg(&self.printer).arg("-t").arg(name);
        match data_type {
            DataType::Raw => {
                cmd.arg("-o").arg("raw");
            }
        }

        let child = cmd
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .context("Failed to execute lp")?;

        self.child = Some(child);
        Ok(())
    }

    fn start_page(&mut self) -> Result<()> {
        self.child()?;
        self.page_open = true;
        Ok(())
    }

    fn write(&mut self, data: &[u8]) -> Result<usize> {
        if !self.page_open {
            anyhow::bail!("No page started");
        }

        let stdin = self
            .child()?
            .stdin
            .as_mut()
            .context("lp input already closed")?;
        stdin
            .write_all(data)
            .context("Failed to stream data to lp")?;

        Ok(data.len())
    }

    fn end_page(&mut self) -> Result<()> {
        if !self.page_open {
            anyhow::bail!("No page started");
        }

        if let Some(stdin) = self.child()?.stdin.as_mut() {
            stdin.flush().context("Failed to flush data to lp")?;
        }
        self.page_open = false;
        Ok(())
    }

    fn end_document(&mut self) -> Result<()> {
        let mut child = self.child.take().context("No document started")?;

        // Closing stdin is the end-of-document signal for lp
        drop(child.stdin.take());

        let output = child
            .wait_with_output()
            .context("Failed to wait for lp")?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            anyhow::bail!("lp exited with {}: {}", output.status, stderr.trim());
        }

        if !stdout.trim().is_empty() {
            debug!("lp: {}", stdout.trim());
        }

        Ok(())
    }
}

impl Drop for CupsSession {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            warn!("Abandoning unfinished document on '{}'", self.printer);
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::path::Path;

    fn sh(script: &str) -> Vec<String> {
        vec![
            "sh".to_string(),
            "-c".to_string(),
            script.to_string(),
            "fake".to_string(),
        ]
    }

    fn idle_lpstat() -> Vec<String> {
        sh("echo \"printer $2 is idle.  enabled since today\"")
    }

    /// `lp` stand-in that stores its arguments and input under `dir`
    fn capturing_lp(dir: &Path) -> Vec<String> {
        sh(&format!(
            "echo \"$@\" > '{0}/args' && cat > '{0}/data'",
            dir.display()
        ))
    }

    fn print(spooler: &CupsSpooler, data: &[u8]) -> Result<()> {
        let mut session = spooler.open("Zebra")?;
        session.start_document("Zebra label - ID 42", DataType::Raw)?;
        session.start_page()?;
        session.write(data)?;
        session.end_page()?;
        session.end_document()
    }

    #[test]
    fn test_submits_raw_document() {
        let tmp = tempfile::tempdir().unwrap();
        let spooler = CupsSpooler::with_commands(idle_lpstat(), capturing_lp(tmp.path()));
        let data = b"^XA^FD\xe7\x1e^FS^XZ";

        print(&spooler, data).unwrap();

        let args = std::fs::read_to_string(tmp.path().join("args")).unwrap();
        assert_eq!(args.trim(), "-d Zebra -t Zebra label - ID 42 -o raw");
        assert_eq!(std::fs::read(tmp.path().join("data")).unwrap(), data);
    }

    #[test]
    fn test_unknown_printer_fails_open() {
        let spooler = CupsSpooler::with_commands(
            sh("echo 'lpstat: Invalid destination name' >&2; exit 1"),
            vec!["lp".to_string()],
        );

        let err = spooler.open("Missing").err().unwrap();
        assert!(err.to_string().contains("not available"));
    }

    #[test]
    fn test_disabled_printer_fails_open() {
        let spooler = CupsSpooler::with_commands(
            sh("echo \"printer $2 disabled since today\""),
            vec!["lp".to_string()],
        );

        let err = spooler.open("Zebra").err().unwrap();
        assert!(err.to_string().contains("disabled"));
    }

    #[test]
    fn test_disabled_in_description_is_not_disabled() {
        let spooler = CupsSpooler::with_commands(
            sh("echo \"printer $2 is idle.  enabled since today\"; echo '\tDescription: disabled-access dock'"),
            vec!["lp".to_string()],
        );
        assert!(spooler.open("Zebra").is_ok());

        let spooler = CupsSpooler::with_commands(idle_lpstat(), vec!["lp".to_string()]);
        assert!(spooler.open("Zebra-disabled").is_ok());
    }

    #[test]
    fn test_lp_failure_fails_document() {
        let spooler = CupsSpooler::with_commands(
            idle_lpstat(),
            sh("cat > /dev/null; echo 'lp: Unable to print' >&2; exit 1"),
        );

        let err = print(&spooler, b"^XA^XZ").unwrap_err();
        assert!(err.to_string().contains("Unable to print"));
    }

    #[test]
    fn test_write_requires_page() {
        let tmp = tempfile::tempdir().unwrap();
        let spooler = CupsSpooler::with_commands(idle_lpstat(), capturing_lp(tmp.path()));

        let mut session = spooler.open("Zebra").unwrap();
        session
            .start_document("Zebra label - ID 1", DataType::Raw)
            .unwrap();
        assert!(session.write(b"^XA^XZ").is_err());
    }
}
