//! Scheduler layer for the agent
//!
//! Drives the delivery cycle on a fixed timer.

pub mod delivery;

pub use delivery::DeliveryLoop;
