//! Append-only auto-ping log

use crate::models::{ProbeOutcome, ProbeRecord};
use crate::types::Region;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared, append-only list of auto-ping records.
///
/// Clones share the same records. Timestamps never go backwards: a wall
/// clock step back is clamped to the previous record's time.
#[derive(Debug, Clone, Default)]
pub struct ProbeLog {
    records: Arc<RwLock<Vec<ProbeRecord>>>,
}

impl ProbeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp and append one outcome, returning the stored record
    pub async fn append(&self, region: Region, outcome: ProbeOutcome) -> ProbeRecord {
        let mut records = self.records.write().await;

        let mut timestamp = Utc::now();
        if let Some(last) = records.last() {
            timestamp = timestamp.max(last.timestamp);
        }

        let record = ProbeRecord::new(region, timestamp, outcome);
        records.push(record.clone());
        record
    }

    /// Copy of every record so far, oldest first
    pub async fn snapshot(&self) -> Vec<ProbeRecord> {
        self.records.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    pub async fn last(&self) -> Option<ProbeRecord> {
        self.records.read().await.last().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FailureReason;

    #[tokio::test]
    async fn test_append_keeps_order() {
        let log = ProbeLog::new();
        assert!(log.is_empty().await);

        log.append(Region::from("A"), ProbeOutcome::success(10)).await;
        log.append(Region::from("B"), ProbeOutcome::failure(FailureReason::TimedOut)).await;

        let records = log.snapshot().await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].region, Region::from("A"));
        assert_eq!(log.last().await.map(|r| r.region), Some(Region::from("B")));
    }

    #[tokio::test]
    async fn test_timestamps_never_decrease() {
        let log = ProbeLog::new();
        for i in 0..50 {
            log.append(Region::from("A"), ProbeOutcome::success(i)).await;
        }

        let records = log.snapshot().await;
        assert!(records.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[tokio::test]
    async fn test_clones_share_records() {
        let log = ProbeLog::new();
        let view = log.clone();
        log.append(Region::from("A"), ProbeOutcome::Unmapped).await;
        assert_eq!(view.len().await, 1);
    }
}
