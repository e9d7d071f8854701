//! Repository layer
//!
//! Repositories abstract communication with the queue service behind a
//! trait, so the delivery cycle can be exercised without a network.

mod queue;

pub use queue::QueueRepository;
