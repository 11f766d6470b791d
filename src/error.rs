//! Error types for ssrf-gate.

use std::net::IpAddr;
use thiserror::Error;

use crate::verdict::ReasonCode;

/// Why a URL was rejected.
///
/// Every variant maps onto exactly one [`ReasonCode`]; the extra fields are
/// for logs and for callers of [`inspect_url`](crate::inspect_url) that want
/// more than the bare code.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// The input is not an absolute URL.
    #[error("Invalid URL: {url} - {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Scheme other than http/https.
    #[error("Invalid scheme '{scheme}' in {url}, only http/https allowed")]
    InvalidScheme { url: String, scheme: String },

    /// The URL carries `user:pass@`.
    #[error("Credentials not allowed in {url}")]
    CredentialsNotAllowed { url: String },

    /// Host is empty after normalization.
    #[error("Invalid hostname in {url}")]
    InvalidHostname { url: String },

    /// Host matched a static hostname rule.
    #[error("Hostname blocked: {host} - {rule}")]
    HostnameBlocked { host: String, rule: &'static str },

    /// Literal IP host is in a reserved range, or could not be parsed.
    #[error("IP blocked: {host} - {reason}")]
    IpBlocked { host: String, reason: &'static str },

    /// DNS returned nothing usable.
    #[error("DNS lookup failed for {host}: {message}")]
    DnsLookupFailed { host: String, message: String },

    /// At least one DNS answer is in a reserved range.
    #[error("DNS for {host} resolves to blocked IP {ip} - {reason}")]
    DnsResolvesToBlockedIp {
        host: String,
        ip: IpAddr,
        reason: &'static str,
    },
}

impl Error {
    /// The machine-readable code for this rejection.
    pub fn reason(&self) -> ReasonCode {
        match self {
            Self::InvalidUrl { .. } => ReasonCode::InvalidUrl,
            Self::InvalidScheme { .. } => ReasonCode::InvalidScheme,
            Self::CredentialsNotAllowed { .. } => ReasonCode::CredentialsNotAllowed,
            Self::InvalidHostname { .. } => ReasonCode::InvalidHostname,
            Self::HostnameBlocked { .. } => ReasonCode::HostnameBlocked,
            Self::IpBlocked { .. } => ReasonCode::IpBlocked,
            Self::DnsLookupFailed { .. } => ReasonCode::DnsLookupFailed,
            Self::DnsResolvesToBlockedIp { .. } => ReasonCode::DnsResolvesToBlockedIp,
        }
    }

    pub(crate) fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_scheme(url: impl Into<String>, scheme: impl Into<String>) -> Self {
        Self::InvalidScheme {
            url: url.into(),
            scheme: scheme.into(),
        }
    }

    pub(crate) fn hostname_blocked(host: impl Into<String>, rule: &'static str) -> Self {
        Self::HostnameBlocked {
            host: host.into(),
            rule,
        }
    }

    pub(crate) fn ip_blocked(host: impl Into<String>, reason: &'static str) -> Self {
        Self::IpBlocked {
            host: host.into(),
            reason,
        }
    }

    pub(crate) fn dns_lookup_failed(host: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DnsLookupFailed {
            host: host.into(),
            message: message.into(),
        }
    }
}
