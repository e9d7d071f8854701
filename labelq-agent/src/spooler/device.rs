//! Direct device spooler
//!
//! Writes raw bytes to a device node (`/dev/usb/lp0`) or a shared printer
//! path (`\\localhost\EtqEmbalagem`). The open file is the printer handle;
//! closing it ends the job.

use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

use super::{DataType, PrintSpooler, PrinterSession};

/// Spooler that writes to a fixed device path
#[derive(Debug, Clone)]
pub struct DeviceSpooler {
    path: PathBuf,
}

impl DeviceSpooler {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl PrintSpooler for DeviceSpooler {
    fn open(&self, printer: &str) -> Result<Box<dyn PrinterSession>> {
        let file = OpenOptions::new()
            .write(true)
            .open(&self.path)
            .with_context(|| {
                format!(
                    "Failed to open device {} for printer '{}'",
                    self.path.display(),
                    printer
                )
            })?;

        Ok(Box::new(DeviceSession {
            file,
            document: None,
            page_open: false,
        }))
    }
}

struct DeviceSession {
    file: File,
    document: Option<String>,
    page_open: bool,
}

impl PrinterSession for DeviceSession {
    fn start_document(&mut self, name: &str, data_type: DataType) -> Result<()> {
        if self.document.is_some() {
            anyhow::bail!("A document is already open");
        }
        // A device file only ever receives raw bytes
        let DataType::Raw = data_type;
        debug!("Starting document '{}'", name);
        self.document = Some(name.to_string());
        Ok(())
    }

    fn start_page(&mut self) -> Result<()> {
        if self.document.is_none() {
            anyhow::bail!("No document started");
        }
        self.page_open = true;
        Ok(())
    }

    fn write(&mut self, data: &[u8]) -> Result<usize> {
        if !self.page_open {
            anyhow::bail!("No page started");
        }
        self.file.write(data).context("Failed to write to device")
    }

    fn end_page(&mut self) -> Result<()> {
        if !self.page_open {
            anyhow::bail!("No page started");
        }
        self.file.flush().context("Failed to flush device")?;
        self.page_open = false;
        Ok(())
    }

    fn end_document(&mut self) -> Result<()> {
        let name = self.document.take().context("No document started")?;
        self.file.flush().context("Failed to flush device")?;
        debug!("Finished document '{}'", name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_raw_bytes() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let spooler = DeviceSpooler::new(tmp.path().to_path_buf());
        let data = b"^XA^FD\xe9\xff\x1e^FS^XZ";

        let mut session = spooler.open("Zebra").unwrap();
        session
            .start_document("Zebra label - ID 42", DataType::Raw)
            .unwrap();
        session.start_page().unwrap();
        assert_eq!(session.write(data).unwrap(), data.len());
        session.end_page().unwrap();
        session.end_document().unwrap();
        drop(session);

        assert_eq!(std::fs::read(tmp.path()).unwrap(), data);
    }

    #[test]
    fn test_missing_device_fails_open() {
        let tmp = tempfile::tempdir().unwrap();
        let spooler = DeviceSpooler::new(tmp.path().join("lp9"));
        assert!(spooler.open("Zebra").is_err());
    }

    #[test]
    fn test_protocol_order_is_enforced() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let spooler = DeviceSpooler::new(tmp.path().to_path_buf());

        let mut session = spooler.open("Zebra").unwrap();
        assert!(session.start_page().is_err());
        assert!(session.end_document().is_err());
        session
            .start_document("Zebra label - ID 1", DataType::Raw)
            .unwrap();
        assert!(session.write(b"^XA^XZ").is_err());
    }
}
