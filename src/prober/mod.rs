//! Single bounded-timeout latency probes
//!
//! A [`Prober`] turns a host address and a timeout into a classified
//! [`ProbeOutcome`]. It never returns an error and never panics: failed
//! resolution, missing replies and socket faults are all outcomes.

pub mod icmp;
pub mod resolver;
pub mod scripted;

pub use icmp::IcmpProber;
pub use resolver::HostResolver;
pub use scripted::ScriptedProber;

use crate::directory::EndpointDirectory;
use crate::models::ProbeOutcome;
use crate::types::Region;
use async_trait::async_trait;
use std::time::Duration;

/// One latency measurement against a host address
#[async_trait]
pub trait Prober: Send + Sync {
    /// Probe `address` once, bounded by `timeout` end to end
    async fn probe(&self, address: &str, timeout: Duration) -> ProbeOutcome;
}

#[async_trait]
impl<P: Prober + ?Sized> Prober for std::sync::Arc<P> {
    async fn probe(&self, address: &str, timeout: Duration) -> ProbeOutcome {
        (**self).probe(address, timeout).await
    }
}

/// Probe a region through the directory.
///
/// A region without an endpoint yields [`ProbeOutcome::Unmapped`] and the
/// prober is not called.
pub async fn probe_region<P>(
    directory: &EndpointDirectory,
    prober: &P,
    region: &Region,
    timeout: Duration,
) -> ProbeOutcome
where
    P: Prober + ?Sized,
{
    match directory.lookup(region) {
        Some(address) => prober.probe(address, timeout).await,
        None => ProbeOutcome::Unmapped,
    }
}
