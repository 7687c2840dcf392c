//! Host name resolution for probe targets

use crate::error::{AppError, Result};
use std::net::IpAddr;
use tokio::sync::OnceCell;
use trust_dns_resolver::{
    config::{ResolverConfig, ResolverOpts},
    system_conf,
    TokioAsyncResolver,
};

/// Resolves endpoint host names with the system resolver configuration.
///
/// The underlying resolver is created on first use. When the system
/// configuration cannot be read the library defaults are used instead.
#[derive(Default)]
pub struct HostResolver {
    resolver: OnceCell<TokioAsyncResolver>,
}

impl HostResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `host` to the address a probe should target.
    ///
    /// IP literals are returned as-is. For names, the first IPv4 address is
    /// preferred, falling back to the first address of any family.
    pub async fn resolve(&self, host: &str) -> Result<IpAddr> {
        let host = host.trim();
        if host.is_empty() {
            return Err(AppError::dns_resolution("empty host name"));
        }

        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(ip);
        }

        let resolver = self.resolver().await;
        let response = resolver
            .lookup_ip(host)
            .await
            .map_err(|e| AppError::dns_resolution(format!("DNS lookup failed for {}: {}", host, e)))?;

        let addresses: Vec<IpAddr> = response.iter().collect();
        pick_address(&addresses)
            .ok_or_else(|| AppError::dns_resolution(format!("no addresses found for {}", host)))
    }

    async fn resolver(&self) -> &TokioAsyncResolver {
        self.resolver
            .get_or_init(|| async {
                let (config, opts) = system_conf::read_system_conf()
                    .unwrap_or_else(|_| (ResolverConfig::default(), ResolverOpts::default()));
                TokioAsyncResolver::tokio(config, opts)
            })
            .await
    }
}

fn pick_address(addresses: &[IpAddr]) -> Option<IpAddr> {
    addresses
        .iter()
        .find(|ip| ip.is_ipv4())
        .or_else(|| addresses.first())
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[tokio::test]
    async fn test_ip_literals_skip_lookup() {
        let resolver = HostResolver::new();
        assert_eq!(
            resolver.resolve("192.0.2.7").await.unwrap(),
            IpAddr::V4(Ipv4Addr::new(192, 0, 2, 7))
        );
        assert_eq!(resolver.resolve(" ::1 ").await.unwrap(), IpAddr::V6(Ipv6Addr::LOCALHOST));
        assert!(resolver.resolver.get().is_none());
    }

    #[tokio::test]
    async fn test_empty_host_is_an_error() {
        let err = HostResolver::new().resolve("   ").await.unwrap_err();
        assert!(matches!(err, AppError::DnsResolution(_)));
    }

    #[test]
    fn test_pick_address_prefers_ipv4() {
        let v6 = IpAddr::V6(Ipv6Addr::LOCALHOST);
        let v4 = IpAddr::V4(Ipv4Addr::LOCALHOST);

        assert_eq!(pick_address(&[v6, v4]), Some(v4));
        assert_eq!(pick_address(&[v6]), Some(v6));
        assert_eq!(pick_address(&[]), None);
    }
}
