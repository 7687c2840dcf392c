//! ICMP echo prober

use super::{HostResolver, Prober};
use crate::defaults::ECHO_PAYLOAD_SIZE;
use crate::models::ProbeOutcome;
use crate::types::FailureReason;
use async_trait::async_trait;
use std::io;
use std::net::IpAddr;
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::Duration;
use surge_ping::{Client, Config as PingConfig, PingIdentifier, PingSequence, SurgeError, ICMP};
use tokio::sync::OnceCell;
use tokio::time::Instant;

/// Sends one ICMP echo request per probe.
///
/// Raw ICMP sockets are opened lazily, one per address family, and shared
/// by every probe made through this instance. Opening them can fail for
/// lack of privileges; that surfaces as an `Error` outcome on each probe.
///
/// Datagram ICMP sockets match replies on address and sequence only, so
/// every echo sent through one instance gets its own sequence number.
#[derive(Default)]
pub struct IcmpProber {
    resolver: HostResolver,
    v4: OnceCell<Client>,
    v6: OnceCell<Client>,
    sequence: AtomicU16,
}

impl IcmpProber {
    pub fn new() -> Self {
        Self::default()
    }

    async fn client_for(&self, ip: IpAddr) -> io::Result<&Client> {
        let (cell, kind) = match ip {
            IpAddr::V4(_) => (&self.v4, ICMP::V4),
            IpAddr::V6(_) => (&self.v6, ICMP::V6),
        };
        cell.get_or_try_init(|| async move { Client::new(&PingConfig::builder().kind(kind).build()) })
            .await
    }

    fn next_sequence(&self) -> PingSequence {
        PingSequence(self.sequence.fetch_add(1, Ordering::Relaxed))
    }

    async fn echo(&self, ip: IpAddr, timeout: Duration) -> ProbeOutcome {
        let client = match self.client_for(ip).await {
            Ok(client) => client,
            Err(e) => return ProbeOutcome::error(format!("cannot open ICMP socket: {}", e)),
        };

        let payload = [0u8; ECHO_PAYLOAD_SIZE];
        let mut pinger = client.pinger(ip, PingIdentifier(rand::random())).await;
        pinger.timeout(timeout);

        match pinger.ping(self.next_sequence(), &payload).await {
            Ok((_, round_trip)) => ProbeOutcome::success(round_trip.as_millis() as u64),
            Err(e) => classify_error(e),
        }
    }
}

#[async_trait]
impl Prober for IcmpProber {
    async fn probe(&self, address: &str, timeout: Duration) -> ProbeOutcome {
        if timeout.is_zero() {
            return ProbeOutcome::error("timeout must be greater than zero");
        }

        let deadline = Instant::now() + timeout;

        let ip = match tokio::time::timeout_at(deadline, self.resolver.resolve(address)).await {
            Ok(Ok(ip)) => ip,
            Ok(Err(e)) => return ProbeOutcome::error(e.to_string()),
            Err(_) => return ProbeOutcome::error("address resolution timed out"),
        };

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return ProbeOutcome::error("address resolution timed out");
        }

        self.echo(ip, remaining).await
    }
}

/// Map an echo failure to an outcome
fn classify_error(error: SurgeError) -> ProbeOutcome {
    match error {
        SurgeError::Timeout { .. } => ProbeOutcome::failure(FailureReason::TimedOut),
        SurgeError::IOError(e) => classify_io_error(&e),
        other => ProbeOutcome::error(other.to_string()),
    }
}

fn classify_io_error(error: &io::Error) -> ProbeOutcome {
    match error.kind() {
        io::ErrorKind::HostUnreachable | io::ErrorKind::NetworkUnreachable => {
            ProbeOutcome::failure(FailureReason::DestinationUnreachable)
        }
        io::ErrorKind::TimedOut => ProbeOutcome::failure(FailureReason::TimedOut),
        _ => ProbeOutcome::error(error.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_zero_timeout_is_an_error() {
        let prober = IcmpProber::new();
        let outcome = prober.probe("192.0.2.1", Duration::ZERO).await;
        assert!(matches!(outcome, ProbeOutcome::Error { .. }));
        assert!(prober.v4.get().is_none());
    }

    #[tokio::test]
    async fn test_unresolvable_host_finishes_within_bound() {
        let prober = IcmpProber::new();
        let bound = Duration::from_millis(1500);

        let started = std::time::Instant::now();
        let outcome = prober.probe("no-such-host.invalid", bound).await;

        assert!(!outcome.is_success());
        assert!(matches!(outcome, ProbeOutcome::Error { .. }));
        assert!(started.elapsed() < bound + Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_silent_address_never_succeeds() {
        // TEST-NET-1 never answers; without ICMP privileges the socket open fails instead
        let prober = IcmpProber::new();
        let bound = Duration::from_millis(200);

        let started = std::time::Instant::now();
        let outcome = prober.probe("192.0.2.1", bound).await;

        assert!(!outcome.is_success());
        assert!(started.elapsed() < bound + Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_concurrent_echoes_to_one_host_are_independent() {
        let prober = IcmpProber::new();
        let bound = Duration::from_millis(1000);

        let (first, second) = tokio::join!(prober.probe("127.0.0.1", bound), prober.probe("127.0.0.1", bound));

        // Without ICMP privileges both fail to open the socket; nothing more to check
        if let ProbeOutcome::Error { message } = &first {
            if message.starts_with("cannot open ICMP socket") {
                return;
            }
        }

        assert!(first.is_success(), "first echo: {:?}", first);
        assert!(second.is_success(), "second echo: {:?}", second);
    }

    #[test]
    fn test_sequence_advances_per_echo() {
        let prober = IcmpProber::new();
        assert_eq!(prober.next_sequence().0, 0);
        assert_eq!(prober.next_sequence().0, 1);

        prober.sequence.store(u16::MAX, Ordering::Relaxed);
        assert_eq!(prober.next_sequence().0, u16::MAX);
        assert_eq!(prober.next_sequence().0, 0);
    }

    #[test]
    fn test_timeout_maps_to_timed_out() {
        let outcome = classify_error(SurgeError::Timeout { seq: PingSequence(0) });
        assert_eq!(outcome, ProbeOutcome::failure(FailureReason::TimedOut));
    }

    #[test]
    fn test_unreachable_io_errors() {
        let host = io::Error::new(io::ErrorKind::HostUnreachable, "no route to host");
        assert_eq!(
            classify_io_error(&host),
            ProbeOutcome::failure(FailureReason::DestinationUnreachable)
        );

        let network = io::Error::new(io::ErrorKind::NetworkUnreachable, "network is unreachable");
        assert_eq!(
            classify_io_error(&network),
            ProbeOutcome::failure(FailureReason::DestinationUnreachable)
        );
    }

    #[test]
    fn test_other_io_errors_are_errors() {
        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "operation not permitted");
        match classify_io_error(&denied) {
            ProbeOutcome::Error { message } => assert!(message.contains("not permitted")),
            other => panic!("unexpected outcome {:?}", other),
        }
    }
}
