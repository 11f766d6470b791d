//! Operator allowlist and the trusted-host override it grants.
//!
//! ## Security Considerations
//!
//! A match here is a **privilege**, not a convenience. When the allowlist is
//! enabled and a host matches, every later check is skipped: the static
//! hostname rules, the literal-IP engines, and DNS rebinding protection.
//! Allowlisting `*.example.com` therefore also trusts every DNS answer any
//! subdomain of `example.com` will ever return, including `127.0.0.1`.
//!
//! The only way to obtain a [`TrustedHostOverride`] is [`Allowlist::grant`],
//! so every code path that bypasses the other checks can be found by
//! searching for that type.
//!
//! ## Spec format
//!
//! ```text
//! example.com, *.internal.example.com; https://api.partner.io/v1
//! ```
//!
//! Entries are separated by commas, semicolons or whitespace. A leading
//! `http://`/`https://` and anything from the first `/` on are dropped.
//! `*.example.com` and `.example.com` both match `example.com` and all of its
//! subdomains; anything else matches exactly. IP literals are ignored: the
//! override is for hostnames only.

use std::fmt;
use std::str::FromStr;

use crate::hostname::{normalize_hostname, NormalizedHost};
use crate::ip::IpLiteral;

/// One allowlist entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HostPattern {
    /// Matches this host only.
    Exact(String),
    /// Matches this domain and every subdomain. Stored without the leading dot.
    Suffix(String),
}

impl HostPattern {
    /// Match a normalized hostname.
    pub fn matches(&self, host: &str) -> bool {
        match self {
            Self::Exact(exact) => host == exact,
            Self::Suffix(domain) => host
                .strip_suffix(domain.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.ends_with('.')),
        }
    }
}

impl fmt::Display for HostPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(host) => f.write_str(host),
            Self::Suffix(domain) => write!(f, ".{domain}"),
        }
    }
}

/// Parsed allowlist. Duplicates are dropped, first occurrence wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Allowlist {
    patterns: Vec<HostPattern>,
}

impl Allowlist {
    /// Parse a raw allowlist spec. Never fails; unusable entries are skipped.
    ///
    /// IP literals (`10.0.0.5`, `[::1]`) are dropped with a warning rather
    /// than kept as exact patterns, so the trusted-host override can never
    /// admit an address the IP rules block. Allowlist a hostname instead.
    pub fn parse(spec: &str) -> Self {
        let mut patterns: Vec<HostPattern> = Vec::new();
        for entry in spec.split(|c: char| c == ',' || c == ';' || c.is_ascii_whitespace()) {
            let Some(pattern) = parse_entry(entry) else {
                continue;
            };
            if !patterns.contains(&pattern) {
                patterns.push(pattern);
            }
        }
        Self { patterns }
    }

    pub fn patterns(&self) -> &[HostPattern] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether any pattern matches the normalized host.
    pub fn matches(&self, host: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(host))
    }

    /// Grant the trusted-host override for `host`, if a pattern matches.
    pub fn grant(&self, host: &NormalizedHost) -> Option<TrustedHostOverride<'_>> {
        self.patterns
            .iter()
            .find(|p| p.matches(host.as_str()))
            .map(|pattern| TrustedHostOverride { pattern })
    }
}

impl FromStr for Allowlist {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

/// Proof that an allowlist entry matched, which lets a check skip the
/// blocklist, IP and DNS steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrustedHostOverride<'a> {
    pattern: &'a HostPattern,
}

impl<'a> TrustedHostOverride<'a> {
    /// The entry that granted the override.
    pub fn pattern(&self) -> &'a HostPattern {
        self.pattern
    }
}

fn parse_entry(raw: &str) -> Option<HostPattern> {
    let mut entry = raw.trim();
    if entry.is_empty() {
        return None;
    }

    for scheme in ["http://", "https://"] {
        if entry
            .get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
        {
            entry = &entry[scheme.len()..];
            break;
        }
    }

    let entry = entry.split('/').next().unwrap_or_default().trim();
    let entry = entry.strip_prefix('*').filter(|rest| rest.starts_with('.')).unwrap_or(entry);

    let host = normalize_hostname(entry)?.into_string();
    let pattern = match host.strip_prefix('.') {
        Some("") => return None,
        Some(domain) => HostPattern::Suffix(domain.to_string()),
        None => HostPattern::Exact(host),
    };

    if let HostPattern::Exact(host) = &pattern {
        if IpLiteral::detect(host).is_some() {
            tracing::warn!(
                entry = raw,
                "ignoring IP literal in allowlist, the trusted-host override applies to hostnames only"
            );
            return None;
        }
    }

    Some(pattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host(raw: &str) -> NormalizedHost {
        normalize_hostname(raw).unwrap()
    }

    // ==================== Parsing ====================

    #[test]
    fn test_parse_exact_and_suffix() {
        let list = Allowlist::parse("example.com, *.internal.example.com");
        assert_eq!(
            list.patterns(),
            &[
                HostPattern::Exact("example.com".into()),
                HostPattern::Suffix("internal.example.com".into()),
            ]
        );
    }

    #[test]
    fn test_parse_leading_dot_is_suffix() {
        let list = Allowlist::parse(".example.com");
        assert_eq!(list.patterns(), &[HostPattern::Suffix("example.com".into())]);
    }

    #[test]
    fn test_parse_strips_scheme_and_path() {
        let list = Allowlist::parse("https://API.Example.com/v1/things HTTP://docs.example.com/");
        assert_eq!(
            list.patterns(),
            &[
                HostPattern::Exact("api.example.com".into()),
                HostPattern::Exact("docs.example.com".into()),
            ]
        );
    }

    #[test]
    fn test_parse_delimiters() {
        let list = Allowlist::parse("a.example\nb.example;c.example , d.example\t\te.example");
        assert_eq!(list.len(), 5);
    }

    #[test]
    fn test_parse_normalizes_and_dedupes() {
        let list = Allowlist::parse("Example.com, example.com., EXAMPLE.COM, *.example.com, .Example.com");
        assert_eq!(
            list.patterns(),
            &[
                HostPattern::Exact("example.com".into()),
                HostPattern::Suffix("example.com".into()),
            ]
        );
    }

    #[test]
    fn test_parse_discards_empty_entries() {
        let list = Allowlist::parse(" , ;; *. . .. https:// https:///path");
        assert!(list.is_empty(), "{:?}", list.patterns());
    }

    #[test]
    fn test_parse_discards_ip_literals() {
        let list = Allowlist::parse("127.0.0.1, [::1], 10.0.0.0, ok.example");
        assert_eq!(list.patterns(), &[HostPattern::Exact("ok.example".into())]);
    }

    #[test]
    fn test_from_str() {
        let list: Allowlist = "example.com".parse().unwrap();
        assert!(list.matches("example.com"));
    }

    // ==================== Matching ====================

    #[test]
    fn test_suffix_semantics() {
        let list = Allowlist::parse(".example.com");
        assert!(list.matches("example.com"));
        assert!(list.matches("api.example.com"));
        assert!(list.matches("a.b.example.com"));
        assert!(!list.matches("notexample.com"));
        assert!(!list.matches("example.com.evil.net"));
    }

    #[test]
    fn test_exact_semantics() {
        let list = Allowlist::parse("example.com");
        assert!(list.matches("example.com"));
        assert!(!list.matches("api.example.com"));
        assert!(!list.matches("example.co"));
    }

    #[test]
    fn test_grant_reports_matching_pattern() {
        let list = Allowlist::parse("other.example, *.example.com");
        let grant = list.grant(&host("API.example.com")).unwrap();
        assert_eq!(grant.pattern(), &HostPattern::Suffix("example.com".into()));
        assert_eq!(grant.pattern().to_string(), ".example.com");

        assert!(list.grant(&host("example.org")).is_none());
    }

    #[test]
    fn test_empty_allowlist_grants_nothing() {
        assert!(Allowlist::default().grant(&host("localhost")).is_none());
    }
}
