//! DNS resolution and the anti-rebinding guard.

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::config::LookupIpStrategy;
use hickory_resolver::TokioResolver;

use crate::error::Error;
use crate::hostname::NormalizedHost;
use crate::ip::is_ip_blocked;

/// Errors a [`Resolver`] can report. The guard folds all of them into
/// [`Error::DnsLookupFailed`].
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("lookup timed out after {0:?}")]
    Timeout(Duration),

    #[error("resolver configuration error: {0}")]
    Config(String),

    #[error("lookup failed: {0}")]
    Lookup(String),
}

/// Something that can turn a hostname into every address it answers with.
///
/// Implementations must not cache answers between calls.
#[async_trait]
pub trait Resolver: Send + Sync {
    async fn lookup(&self, host: &str) -> Result<Vec<IpAddr>, ResolveError>;
}

/// The system resolver (`/etc/resolv.conf` or the platform equivalent).
///
/// A fresh hickory resolver is built for every lookup, so nothing survives
/// between calls and every check sees live DNS.
#[derive(Debug, Clone)]
pub struct SystemResolver {
    timeout: Duration,
}

impl SystemResolver {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    pub fn new() -> Self {
        Self {
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Bound each lookup. Expiry is reported as [`ResolveError::Timeout`].
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for SystemResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Resolver for SystemResolver {
    async fn lookup(&self, host: &str) -> Result<Vec<IpAddr>, ResolveError> {
        let resolver = build_system_resolver()?;

        let response = tokio::time::timeout(self.timeout, resolver.lookup_ip(host))
            .await
            .map_err(|_| ResolveError::Timeout(self.timeout))?
            .map_err(|e| ResolveError::Lookup(e.to_string()))?;

        Ok(response.iter().collect())
    }
}

/// System configuration, asking for A and AAAA records on every lookup.
///
/// hickory's default strategy only falls back to AAAA when there is no A
/// record, which would hide a private IPv6 answer behind a public IPv4 one.
fn build_system_resolver() -> Result<TokioResolver, ResolveError> {
    let mut builder =
        TokioResolver::builder_tokio().map_err(|e| ResolveError::Config(e.to_string()))?;
    builder.options_mut().ip_strategy = LookupIpStrategy::Ipv4AndIpv6;
    Ok(builder.build())
}

/// Resolve `host` and reject it if any answer is in a blocked range.
///
/// One bad answer is enough: the HTTP client that eventually connects picks
/// its own address from the set, and this guard does not control which.
/// Returns every resolved address when all of them pass.
pub async fn check_resolved_host<R>(host: &NormalizedHost, resolver: &R) -> Result<Vec<IpAddr>, Error>
where
    R: Resolver + ?Sized,
{
    let addresses = resolver
        .lookup(host.as_str())
        .await
        .map_err(|e| Error::dns_lookup_failed(host.as_str(), e.to_string()))?;

    if addresses.is_empty() {
        return Err(Error::dns_lookup_failed(host.as_str(), "no IP addresses found"));
    }

    for &ip in &addresses {
        if let Some(reason) = is_ip_blocked(ip) {
            return Err(Error::DnsResolvesToBlockedIp {
                host: host.to_string(),
                ip,
                reason,
            });
        }
    }

    tracing::trace!(host = %host, count = addresses.len(), "all resolved addresses are public");
    Ok(addresses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hostname::normalize_hostname;
    use crate::verdict::ReasonCode;

    struct Answers(Result<Vec<IpAddr>, &'static str>);

    #[async_trait]
    impl Resolver for Answers {
        async fn lookup(&self, _host: &str) -> Result<Vec<IpAddr>, ResolveError> {
            self.0
                .clone()
                .map_err(|e| ResolveError::Lookup(e.to_string()))
        }
    }

    fn ips(list: &[&str]) -> Vec<IpAddr> {
        list.iter().map(|s| s.parse().unwrap()).collect()
    }

    fn host() -> NormalizedHost {
        normalize_hostname("target.example").unwrap()
    }

    #[tokio::test]
    async fn test_public_answers_pass() {
        let resolver = Answers(Ok(ips(&["93.184.216.34", "2606:2800:220:1::"])));
        let addrs = check_resolved_host(&host(), &resolver).await.unwrap();
        assert_eq!(addrs.len(), 2);
    }

    #[tokio::test]
    async fn test_one_private_answer_poisons_host() {
        let resolver = Answers(Ok(ips(&["203.0.113.9", "10.0.0.5"])));
        let err = check_resolved_host(&host(), &resolver).await.unwrap_err();
        assert_eq!(err.reason(), ReasonCode::DnsResolvesToBlockedIp);
        match err {
            Error::DnsResolvesToBlockedIp { ip, .. } => assert_eq!(ip, "10.0.0.5".parse::<IpAddr>().unwrap()),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_ipv6_answers_are_classified() {
        let resolver = Answers(Ok(ips(&["2001:db8::1", "fd00::1"])));
        let err = check_resolved_host(&host(), &resolver).await.unwrap_err();
        assert_eq!(err.reason(), ReasonCode::DnsResolvesToBlockedIp);

        let resolver = Answers(Ok(ips(&["::ffff:127.0.0.1"])));
        let err = check_resolved_host(&host(), &resolver).await.unwrap_err();
        assert_eq!(err.reason(), ReasonCode::DnsResolvesToBlockedIp);
    }

    #[tokio::test]
    async fn test_empty_answer_fails_lookup() {
        let resolver = Answers(Ok(Vec::new()));
        let err = check_resolved_host(&host(), &resolver).await.unwrap_err();
        assert_eq!(err.reason(), ReasonCode::DnsLookupFailed);
    }

    #[tokio::test]
    async fn test_resolver_error_fails_lookup() {
        let resolver = Answers(Err("NXDOMAIN"));
        let err = check_resolved_host(&host(), &resolver).await.unwrap_err();
        assert_eq!(err.reason(), ReasonCode::DnsLookupFailed);
        assert!(err.to_string().contains("NXDOMAIN"));
    }

    #[test]
    fn test_system_resolver_timeout_is_configurable() {
        assert_eq!(SystemResolver::new().timeout(), SystemResolver::DEFAULT_TIMEOUT);
        let resolver = SystemResolver::with_timeout(Duration::from_millis(250));
        assert_eq!(resolver.timeout(), Duration::from_millis(250));
    }

    #[tokio::test]
    async fn test_system_resolver_asks_for_both_families() {
        let resolver = build_system_resolver().unwrap();
        assert_eq!(resolver.options().ip_strategy, LookupIpStrategy::Ipv4AndIpv6);
    }

    #[tokio::test]
    #[ignore = "requires network access"]
    async fn test_system_resolver_live_lookup() {
        let addrs = SystemResolver::new().lookup("example.com").await.unwrap();
        assert!(!addrs.is_empty());
    }
}
