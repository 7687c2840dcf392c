//! Batch probing across regions
//!
//! [`BatchRunner`] probes a list of regions and hands each outcome to a
//! report callback as soon as that probe completes. Probes run with a
//! bounded number in flight (or strictly one after another), and a slow
//! or failing region never holds up the report of another.

use crate::{
    directory::EndpointDirectory,
    logging::ProbeLogger,
    models::{Config, OutcomeKind, ProbeOutcome},
    prober::{probe_region, Prober},
    types::Region,
};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// How a batch schedules its probes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchMode {
    /// Up to `max_in_flight` probes at once; reports arrive in completion order
    Concurrent { max_in_flight: usize },
    /// One probe at a time in region order
    Sequential,
}

impl BatchMode {
    fn limit(&self) -> usize {
        match self {
            Self::Concurrent { max_in_flight } => (*max_in_flight).max(1),
            Self::Sequential => 1,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Concurrent { max_in_flight } => format!("concurrent, up to {} in flight", max_in_flight),
            Self::Sequential => "sequential".to_string(),
        }
    }
}

/// Execution settings for a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Bound on each probe
    pub timeout: Duration,
    pub mode: BatchMode,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            timeout: crate::defaults::DEFAULT_TIMEOUT,
            mode: BatchMode::Concurrent {
                max_in_flight: crate::defaults::DEFAULT_MAX_CONCURRENCY,
            },
        }
    }
}

impl From<&Config> for ExecutionConfig {
    fn from(config: &Config) -> Self {
        let mode = if config.sequential {
            BatchMode::Sequential
        } else {
            BatchMode::Concurrent { max_in_flight: config.max_concurrency }
        };

        Self { timeout: config.timeout(), mode }
    }
}

/// Aggregate of the outcomes reported during a batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub errored: usize,
    pub unmapped: usize,
    /// Region with the lowest round-trip time and that time
    pub fastest: Option<(Region, u64)>,
    /// Region with the highest round-trip time and that time
    pub slowest: Option<(Region, u64)>,
    pub duration: Duration,
}

impl BatchSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one reported outcome
    pub fn record(&mut self, region: &Region, outcome: &ProbeOutcome) {
        self.total += 1;
        match outcome.kind() {
            OutcomeKind::Success => self.succeeded += 1,
            OutcomeKind::Failure => self.failed += 1,
            OutcomeKind::Error => self.errored += 1,
            OutcomeKind::Unmapped => self.unmapped += 1,
        }

        if let Some(rtt) = outcome.round_trip_ms() {
            if self.fastest.as_ref().map_or(true, |(_, best)| rtt < *best) {
                self.fastest = Some((region.clone(), rtt));
            }
            if self.slowest.as_ref().map_or(true, |(_, worst)| rtt > *worst) {
                self.slowest = Some((region.clone(), rtt));
            }
        }
    }

    /// Check if any region replied
    pub fn any_success(&self) -> bool {
        self.succeeded > 0
    }

    /// Percentage of regions that replied
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.succeeded as f64 / self.total as f64 * 100.0
        }
    }
}

/// Drives a prober over a set of regions
pub struct BatchRunner {
    directory: Arc<EndpointDirectory>,
    prober: Arc<dyn Prober>,
    config: ExecutionConfig,
    logger: ProbeLogger,
}

impl BatchRunner {
    pub fn new(directory: Arc<EndpointDirectory>, prober: Arc<dyn Prober>, config: ExecutionConfig) -> Self {
        Self {
            directory,
            prober,
            config,
            logger: ProbeLogger::silent(),
        }
    }

    pub fn with_logger(mut self, logger: ProbeLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    /// Probe every region of the directory in display order
    pub async fn probe_directory<F>(&self, report: F) -> BatchSummary
    where
        F: FnMut(&Region, &ProbeOutcome),
    {
        let regions = self.directory.regions().to_vec();
        self.probe_all(&regions, report).await
    }

    /// Probe `regions`, reporting each outcome as it completes.
    ///
    /// Exactly one report is made per entry of `regions`, duplicates
    /// included. There is no overall failure mode.
    pub async fn probe_all<F>(&self, regions: &[Region], mut report: F) -> BatchSummary
    where
        F: FnMut(&Region, &ProbeOutcome),
    {
        let started = Instant::now();
        let correlation_id = self
            .logger
            .log_batch_start(regions.len(), &self.config.mode.describe())
            .await;

        let timeout = self.config.timeout;
        let probes = regions.iter().map(|region| async move {
            let probe_started = Instant::now();
            let outcome = probe_region(&self.directory, self.prober.as_ref(), region, timeout).await;
            self.logger
                .log_probe(region, self.directory.lookup(region), &outcome, probe_started.elapsed())
                .await;
            (region, outcome)
        });

        let mut summary = BatchSummary::new();
        let mut completed = stream::iter(probes).buffer_unordered(self.config.mode.limit());
        while let Some((region, outcome)) = completed.next().await {
            summary.record(region, &outcome);
            report(region, &outcome);
        }

        summary.duration = started.elapsed();
        self.logger
            .log_batch_summary(&correlation_id, summary.total, summary.succeeded, summary.duration)
            .await;

        summary
    }
}
