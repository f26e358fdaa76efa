//! Shared models for jollyip: target expressions, address collections,
//! probe results and the run configuration.

pub mod config;
pub mod error;
pub mod log;
pub mod network;
pub mod sweep;
