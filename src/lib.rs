//! net-rewind: network time travel
//!
//! A library for reconstructing the historical state of a monitored network
//! from timestamped per-device observations, and for classifying what changed
//! between two reconstructed states.

pub mod change;
pub mod config;
pub mod observation;
pub mod snapshot;
pub mod source;
pub mod timeline;
