//! Prober with scripted replies, for tests, benchmarks and dry runs

use super::Prober;
use crate::models::ProbeOutcome;
use crate::types::FailureReason;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Reply rule for one address
#[derive(Debug, Clone)]
struct Script {
    outcome: ProbeOutcome,
    delay: Duration,
}

/// Answers probes from a table instead of the network.
///
/// A reply whose delay exceeds the probe timeout turns into
/// `Failure{TimedOut}` once the timeout elapses, the way a silent host
/// behaves. Delays use tokio time, so paused-clock tests stay instant.
#[derive(Debug)]
pub struct ScriptedProber {
    default: Script,
    scripts: HashMap<String, Script>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedProber {
    /// Every address answers with `outcome` immediately
    pub fn new(outcome: ProbeOutcome) -> Self {
        Self {
            default: Script { outcome, delay: Duration::ZERO },
            scripts: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Delay applied to addresses without their own rule
    pub fn with_default_delay(mut self, delay: Duration) -> Self {
        self.default.delay = delay;
        self
    }

    /// Answer `address` with `outcome` after `delay`
    pub fn with_reply(mut self, address: impl Into<String>, outcome: ProbeOutcome, delay: Duration) -> Self {
        self.scripts.insert(address.into(), Script { outcome, delay });
        self
    }

    /// `address` never answers
    pub fn with_silent(self, address: impl Into<String>) -> Self {
        self.with_reply(address, ProbeOutcome::failure(FailureReason::TimedOut), Duration::MAX)
    }

    /// Addresses probed so far, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|calls| calls.len()).unwrap_or(0)
    }
}

#[async_trait]
impl Prober for ScriptedProber {
    async fn probe(&self, address: &str, timeout: Duration) -> ProbeOutcome {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(address.to_string());
        }

        if timeout.is_zero() {
            return ProbeOutcome::error("timeout must be greater than zero");
        }

        let script = self.scripts.get(address).unwrap_or(&self.default);
        if script.delay > timeout {
            tokio::time::sleep(timeout).await;
            return ProbeOutcome::failure(FailureReason::TimedOut);
        }

        if !script.delay.is_zero() {
            tokio::time::sleep(script.delay).await;
        }
        script.outcome.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_silent_host_times_out_at_bound() {
        let prober = ScriptedProber::new(ProbeOutcome::success(5)).with_silent("10.0.0.1");
        let started = tokio::time::Instant::now();

        let outcome = prober.probe("10.0.0.1", Duration::from_millis(1000)).await;

        assert_eq!(outcome, ProbeOutcome::failure(FailureReason::TimedOut));
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(1000) && elapsed < Duration::from_millis(1020));
    }

    #[tokio::test(start_paused = true)]
    async fn test_scripted_reply_and_default() {
        let prober = ScriptedProber::new(ProbeOutcome::success(5))
            .with_reply("slow.example", ProbeOutcome::success(300), Duration::from_millis(300));

        assert_eq!(prober.probe("fast.example", Duration::from_secs(1)).await, ProbeOutcome::success(5));
        assert_eq!(prober.probe("slow.example", Duration::from_secs(1)).await, ProbeOutcome::success(300));
        assert_eq!(prober.calls(), vec!["fast.example".to_string(), "slow.example".to_string()]);
    }

    #[tokio::test]
    async fn test_zero_timeout() {
        let prober = ScriptedProber::new(ProbeOutcome::success(5));
        assert!(matches!(prober.probe("x", Duration::ZERO).await, ProbeOutcome::Error { .. }));
    }
}
