//! Probe outcome and log record data models

use crate::types::{FailureReason, PerformanceLevel, Region};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Classified result of a single probe attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProbeOutcome {
    /// The host replied within the timeout
    Success { round_trip_ms: u64 },
    /// The echo mechanism gave a definitive negative answer
    Failure { reason: FailureReason },
    /// Local or transport fault before a reply/non-reply determination
    Error { message: String },
    /// The region has no directory entry; no network call was made
    Unmapped,
}

impl ProbeOutcome {
    pub fn success(round_trip_ms: u64) -> Self {
        Self::Success { round_trip_ms }
    }

    pub fn failure(reason: FailureReason) -> Self {
        Self::Failure { reason }
    }

    pub fn error<S: Into<String>>(message: S) -> Self {
        Self::Error { message: message.into() }
    }

    /// Check if the host replied
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Round-trip time for successful probes
    pub fn round_trip_ms(&self) -> Option<u64> {
        match self {
            Self::Success { round_trip_ms } => Some(*round_trip_ms),
            _ => None,
        }
    }

    /// Performance level for successful probes
    pub fn performance_level(&self) -> Option<PerformanceLevel> {
        self.round_trip_ms().map(PerformanceLevel::from_round_trip)
    }

    pub fn kind(&self) -> OutcomeKind {
        match self {
            Self::Success { .. } => OutcomeKind::Success,
            Self::Failure { .. } => OutcomeKind::Failure,
            Self::Error { .. } => OutcomeKind::Error,
            Self::Unmapped => OutcomeKind::Unmapped,
        }
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success { round_trip_ms } => write!(f, "{} ms", round_trip_ms),
            Self::Failure { reason } => write!(f, "Failed ({})", reason),
            Self::Error { message } => write!(f, "Error ({})", message),
            Self::Unmapped => f.write_str("No endpoint (region not in directory)"),
        }
    }
}

/// Outcome variant without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Success,
    Failure,
    Error,
    Unmapped,
}

/// One timestamped auto-ping result. Records are appended, never edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeRecord {
    /// Region that was probed on this tick
    pub region: Region,
    /// When the outcome was logged
    pub timestamp: DateTime<Utc>,
    /// What the probe returned
    pub outcome: ProbeOutcome,
}

impl ProbeRecord {
    pub fn new(region: Region, timestamp: DateTime<Utc>, outcome: ProbeOutcome) -> Self {
        Self { region, timestamp, outcome }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_display() {
        assert_eq!(ProbeOutcome::success(42).to_string(), "42 ms");
        assert_eq!(
            ProbeOutcome::failure(FailureReason::TimedOut).to_string(),
            "Failed (TimedOut)"
        );
        assert_eq!(ProbeOutcome::error("no route").to_string(), "Error (no route)");
        assert!(ProbeOutcome::Unmapped.to_string().starts_with("No endpoint"));
    }

    #[test]
    fn test_outcome_accessors() {
        let ok = ProbeOutcome::success(120);
        assert!(ok.is_success());
        assert_eq!(ok.round_trip_ms(), Some(120));
        assert_eq!(ok.performance_level(), Some(PerformanceLevel::Fair));
        assert_eq!(ok.kind(), OutcomeKind::Success);

        let failed = ProbeOutcome::failure(FailureReason::DestinationUnreachable);
        assert!(!failed.is_success());
        assert_eq!(failed.round_trip_ms(), None);
        assert_eq!(failed.kind(), OutcomeKind::Failure);
        assert_eq!(ProbeOutcome::Unmapped.kind(), OutcomeKind::Unmapped);
    }

    #[test]
    fn test_outcome_json_shape() {
        let json = serde_json::to_value(ProbeOutcome::success(7)).unwrap();
        assert_eq!(json["kind"], "success");
        assert_eq!(json["round_trip_ms"], 7);

        let json = serde_json::to_value(ProbeOutcome::failure(FailureReason::TtlExpired)).unwrap();
        assert_eq!(json["kind"], "failure");
        assert_eq!(json["reason"], "TtlExpired");

        let json = serde_json::to_value(ProbeOutcome::Unmapped).unwrap();
        assert_eq!(json["kind"], "unmapped");
    }

    #[test]
    fn test_record_serialization() {
        let record = ProbeRecord::new(
            Region::from("Europe (Ireland)"),
            Utc::now(),
            ProbeOutcome::success(31),
        );
        let json = serde_json::to_string(&record).unwrap();
        let back: ProbeRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
