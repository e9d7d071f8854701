//! Core domain types
//!
//! These types are shared between the queue client (which decodes them from
//! the wire) and the agent (which prints and acknowledges them).

pub mod job;
pub mod outcome;
