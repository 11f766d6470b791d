//! Per-call configuration supplied by the caller.

use crate::allowlist::{Allowlist, TrustedHostOverride};
use crate::hostname::NormalizedHost;

/// Caller-supplied settings for one check.
///
/// The library never reads the environment or any global state; the
/// calling process decides where these values come from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Whether the allowlist is consulted at all.
    pub allowlist_enabled: bool,

    /// Hosts granted the trusted-host override.
    pub allowlist_hosts: Allowlist,
}

impl Config {
    /// Build a config from the raw allowlist spec.
    pub fn new(allowlist_enabled: bool, allowlist_hosts: &str) -> Self {
        Self {
            allowlist_enabled,
            allowlist_hosts: Allowlist::parse(allowlist_hosts),
        }
    }

    /// The trusted-host override for `host`, if the allowlist is enabled and
    /// matches.
    pub fn trusted_override(&self, host: &NormalizedHost) -> Option<TrustedHostOverride<'_>> {
        if !self.allowlist_enabled {
            return None;
        }
        self.allowlist_hosts.grant(host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hostname::normalize_hostname;

    #[test]
    fn test_default_is_disabled() {
        let config = Config::default();
        assert!(!config.allowlist_enabled);
        assert!(config.allowlist_hosts.is_empty());
    }

    #[test]
    fn test_disabled_allowlist_grants_nothing() {
        let config = Config::new(false, "localhost");
        let host = normalize_hostname("localhost").unwrap();
        assert!(config.trusted_override(&host).is_none());
    }

    #[test]
    fn test_enabled_allowlist_grants_match() {
        let config = Config::new(true, "*.corp.example");
        let host = normalize_hostname("Wiki.Corp.Example.").unwrap();
        assert!(config.trusted_override(&host).is_some());
    }
}
