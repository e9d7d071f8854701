//! Labelq Core
//!
//! Core types shared by the label-print agent and its queue client.
//!
//! This crate contains:
//! - Domain types: the print job, its identifier and its printer payload
//! - Outcomes: tagged results of each step of a delivery cycle

pub mod domain;
