//! Data models and structures for the region latency tester

pub mod config;
pub mod outcome;

// Re-export main model types
pub use config::Config;
pub use outcome::{OutcomeKind, ProbeOutcome, ProbeRecord};
