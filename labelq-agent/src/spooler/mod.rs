//! Print spooler access
//!
//! The agent talks to printers through a small handle-based protocol:
//! open the printer, start a raw document, start a page, write the data,
//! end the page, end the document. Sessions release whatever they hold
//! (child process, file handle) when dropped, whichever step failed.

mod cups;
mod device;

pub use cups::CupsSpooler;
pub use device::DeviceSpooler;

use anyhow::Result;

use crate::config::SpoolerBackend;

/// How the spooler should treat the submitted bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// Pass bytes to the device unmodified
    Raw,
}

/// Entry point to a print system
pub trait PrintSpooler: Send + Sync {
    /// Opens a handle to the named printer
    fn open(&self, printer: &str) -> Result<Box<dyn PrinterSession>>;
}

/// An open printer handle
///
/// Dropping the session closes the handle. Dropping it before
/// [`PrinterSession::end_document`] abandons the document.
pub trait PrinterSession {
    fn start_document(&mut self, name: &str, data_type: DataType) -> Result<()>;

    fn start_page(&mut self) -> Result<()>;

    /// Writes one block, returning how many bytes were accepted
    fn write(&mut self, data: &[u8]) -> Result<usize>;

    fn end_page(&mut self) -> Result<()>;

    fn end_document(&mut self) -> Result<()>;
}

/// Builds the spooler selected in the configuration
pub fn from_backend(backend: &SpoolerBackend) -> Box<dyn PrintSpooler> {
    match backend {
        SpoolerBackend::Cups => Box::new(CupsSpooler::new()),
        SpoolerBackend::Device(path) => Box::new(DeviceSpooler::new(path.clone())),
    }
}
