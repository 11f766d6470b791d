//! The allow/deny outcome handed back to callers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Closed set of rejection reasons.
///
/// The `snake_case` tokens are a compatibility surface: existing callers
/// match on them verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    InvalidUrl,
    InvalidScheme,
    CredentialsNotAllowed,
    InvalidHostname,
    HostnameBlocked,
    IpBlocked,
    DnsLookupFailed,
    DnsResolvesToBlockedIp,
}

impl ReasonCode {
    pub const ALL: [ReasonCode; 8] = [
        ReasonCode::InvalidUrl,
        ReasonCode::InvalidScheme,
        ReasonCode::CredentialsNotAllowed,
        ReasonCode::InvalidHostname,
        ReasonCode::HostnameBlocked,
        ReasonCode::IpBlocked,
        ReasonCode::DnsLookupFailed,
        ReasonCode::DnsResolvesToBlockedIp,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidUrl => "invalid_url",
            Self::InvalidScheme => "invalid_scheme",
            Self::CredentialsNotAllowed => "credentials_not_allowed",
            Self::InvalidHostname => "invalid_hostname",
            Self::HostnameBlocked => "hostname_blocked",
            Self::IpBlocked => "ip_blocked",
            Self::DnsLookupFailed => "dns_lookup_failed",
            Self::DnsResolvesToBlockedIp => "dns_resolves_to_blocked_ip",
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned by [`ReasonCode::from_str`] for unknown tokens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown reason code: {0}")]
pub struct UnknownReasonCode(pub String);

impl FromStr for ReasonCode {
    type Err = UnknownReasonCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| UnknownReasonCode(s.to_string()))
    }
}

/// Result of [`check_url`](crate::check_url).
///
/// `reason` is `Some` exactly when `allowed` is false.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub allowed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<ReasonCode>,
}

impl Verdict {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    pub fn deny(reason: ReasonCode) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
        }
    }
}

impl<T> From<Result<T, Error>> for Verdict {
    fn from(result: Result<T, Error>) -> Self {
        match result {
            Ok(_) => Self::allow(),
            Err(e) => Self::deny(e.reason()),
        }
    }
}
