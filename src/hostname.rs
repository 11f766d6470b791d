//! Hostname canonicalization.

use std::fmt;

/// A hostname after trimming, lowercasing and dropping one trailing dot.
///
/// No IDNA processing happens here: Unicode hosts compare byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedHost(String);

impl NormalizedHost {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for NormalizedHost {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalize a hostname for comparison. Returns `None` if nothing is left.
pub fn normalize_hostname(raw: &str) -> Option<NormalizedHost> {
    let mut host = raw.trim().to_lowercase();

    // FQDN root label
    if host.ends_with('.') {
        host.pop();
    }

    if host.is_empty() {
        None
    } else {
        Some(NormalizedHost(host))
    }
}
