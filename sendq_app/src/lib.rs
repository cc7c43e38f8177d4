//! # sendq_app
//!
//! Application shell around the rate-limited send queue: tracing setup,
//! configuration loading and graceful shutdown

pub mod config_loader;
pub mod shutdown;
pub mod tracing_setup;
