//! Service layer
//!
//! The three steps of a delivery cycle. Each step turns every failure into
//! a tagged outcome and logs it; none of them ever returns an error.

mod acknowledger;
mod dispatcher;
mod fetcher;

pub use acknowledger::Acknowledger;
pub use dispatcher::PrintDispatcher;
pub use fetcher::Fetcher;
