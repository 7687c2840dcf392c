//! Type definitions and aliases

use serde::{Deserialize, Serialize};
use std::fmt;

// Re-export commonly used types
pub use crate::error::{AppError, Result};

/// A named geographic server location, identified by its display name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Region(String);

impl Region {
    /// Create a region from its display name
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self(name.into())
    }

    /// Display name of the region
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Region {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Region {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Definitive negative reply from the echo mechanism
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureReason {
    /// No reply arrived within the timeout
    TimedOut,
    /// The host or its network could not be reached
    DestinationUnreachable,
    /// The request's time-to-live ran out in transit
    TtlExpired,
}

impl FailureReason {
    /// Status label as shown next to failed probes
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TimedOut => "TimedOut",
            Self::DestinationUnreachable => "DestinationUnreachable",
            Self::TtlExpired => "TtlExpired",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Latency classification used for color coding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceLevel {
    /// Under 50ms
    Excellent,
    /// 50-100ms
    Good,
    /// 100-150ms
    Fair,
    /// 150-250ms
    Poor,
    /// 250ms and above
    VeryPoor,
}

impl PerformanceLevel {
    /// Classify a round-trip time in milliseconds
    pub fn from_round_trip(round_trip_ms: u64) -> Self {
        match round_trip_ms {
            0..=49 => Self::Excellent,
            50..=99 => Self::Good,
            100..=149 => Self::Fair,
            150..=249 => Self::Poor,
            _ => Self::VeryPoor,
        }
    }

    /// Get descriptive text
    pub fn description(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
            Self::VeryPoor => "Very Poor",
        }
    }
}
