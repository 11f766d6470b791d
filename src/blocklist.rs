//! Hostname rules that apply before any address is looked at.

/// A name that is blocked together with all of its subdomains.
const BLOCKED_NAMES: &[&str] = &[
    "localhost", // RFC 6761 loopback names
];

/// Suffixes whose subdomains are blocked (the bare label is not a host).
const BLOCKED_SUFFIXES: &[&str] = &[
    ".local", // mDNS link-local names
];

/// Check if a normalized hostname is blocked by name.
///
/// Returns the matching rule. Runs for IP literals too; they simply never
/// match.
pub fn is_hostname_blocked(host: &str) -> Option<&'static str> {
    for &blocked in BLOCKED_NAMES {
        if host == blocked || is_subdomain_of(host, blocked) {
            return Some(blocked);
        }
    }
    BLOCKED_SUFFIXES
        .iter()
        .copied()
        .find(|suffix| host.ends_with(suffix))
}

fn is_subdomain_of(host: &str, domain: &str) -> bool {
    host.strip_suffix(domain)
        .is_some_and(|rest| rest.ends_with('.'))
}
