//! Literal-address detection and the fail-closed parse result shared by the
//! IPv4 and IPv6 engines.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::{ipv4, ipv6};

/// Reason reported for an address the engines could not parse.
pub(crate) const UNPARSEABLE: &str = "unparseable address - blocked";

/// Outcome of parsing an address literal.
///
/// "Could not parse" is kept distinct from "parsed" so classifiers can
/// decide what it means; every classifier in this crate treats
/// [`Parsed::Unparseable`] as blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parsed<T> {
    Addr(T),
    Unparseable,
}

impl<T> Parsed<T> {
    /// The parsed value, if any.
    pub fn addr(self) -> Option<T> {
        match self {
            Self::Addr(addr) => Some(addr),
            Self::Unparseable => None,
        }
    }

    pub fn is_unparseable(&self) -> bool {
        matches!(self, Self::Unparseable)
    }
}

/// A hostname that is really an IP address literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IpLiteral<'a> {
    V4(&'a str),
    V6(&'a str),
}

impl<'a> IpLiteral<'a> {
    /// Detect a literal in a normalized host.
    ///
    /// Digits and dots only is IPv4; `[...]` is IPv6, which is how the URL
    /// parser hands IPv6 hosts over.
    pub(crate) fn detect(host: &'a str) -> Option<Self> {
        if let Some(inner) = host.strip_prefix('[').and_then(|h| h.strip_suffix(']')) {
            return Some(Self::V6(inner));
        }
        if !host.is_empty() && host.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
            return Some(Self::V4(host));
        }
        None
    }

    /// Run the matching engine: the address if it is safe, the block reason
    /// otherwise.
    pub(crate) fn check(self) -> Result<IpAddr, &'static str> {
        match self {
            Self::V4(text) => match ipv4::parse_ipv4(text) {
                Parsed::Addr(value) => match ipv4::classify_ipv4(value) {
                    Some(reason) => Err(reason),
                    None => Ok(IpAddr::V4(Ipv4Addr::from(value))),
                },
                Parsed::Unparseable => Err(UNPARSEABLE),
            },
            Self::V6(text) => match ipv6::parse_ipv6(text) {
                Parsed::Addr(bytes) => match ipv6::classify_ipv6(&bytes) {
                    Some(reason) => Err(reason),
                    None => Ok(IpAddr::V6(Ipv6Addr::from(bytes))),
                },
                Parsed::Unparseable => Err(UNPARSEABLE),
            },
        }
    }
}

/// Check a resolved address against the reserved ranges.
///
/// Returns the block reason, or `None` if the address is public.
pub fn is_ip_blocked(ip: IpAddr) -> Option<&'static str> {
    match ip {
        IpAddr::V4(v4) => ipv4::classify_ipv4(u32::from(v4)),
        IpAddr::V6(v6) => ipv6::classify_ipv6(&v6.octets()),
    }
}
