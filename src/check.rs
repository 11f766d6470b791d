//! The decision orchestrator: one URL in, one verdict out.

use std::net::IpAddr;

use tokio::runtime::{Handle, RuntimeFlavor};
use url::Url;

use crate::allowlist::HostPattern;
use crate::blocklist::is_hostname_blocked;
use crate::config::Config;
use crate::error::Error;
use crate::ip::IpLiteral;
use crate::resolve::{check_resolved_host, Resolver, SystemResolver};
use crate::safe_url::SafeUrl;
use crate::verdict::{ReasonCode, Verdict};

/// A URL to check, either raw text or already parsed.
#[derive(Debug, Clone)]
pub enum CheckInput<'a> {
    Raw(&'a str),
    Parsed(Url),
}

impl CheckInput<'_> {
    fn into_safe_url(self) -> Result<SafeUrl, Error> {
        match self {
            Self::Raw(input) => SafeUrl::parse(input),
            Self::Parsed(url) => SafeUrl::from_url(url),
        }
    }
}

impl<'a> From<&'a str> for CheckInput<'a> {
    fn from(input: &'a str) -> Self {
        Self::Raw(input)
    }
}

impl<'a> From<&'a String> for CheckInput<'a> {
    fn from(input: &'a String) -> Self {
        Self::Raw(input)
    }
}

impl From<Url> for CheckInput<'_> {
    fn from(url: Url) -> Self {
        Self::Parsed(url)
    }
}

impl From<&Url> for CheckInput<'_> {
    fn from(url: &Url) -> Self {
        Self::Parsed(url.clone())
    }
}

/// Details of an allowed URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inspection {
    /// Normalized hostname (use for Host header / SNI).
    pub host: String,

    /// Port number.
    pub port: u16,

    /// Full URL (normalized).
    pub url: String,

    /// Whether HTTPS.
    pub https: bool,

    /// Allowlist entry that short-circuited the check, if any.
    pub trusted_by: Option<HostPattern>,

    /// Addresses that passed the IP checks. Empty when `trusted_by` is set,
    /// since nothing was resolved.
    pub addresses: Vec<IpAddr>,
}

impl Inspection {
    fn new(safe_url: &SafeUrl, trusted_by: Option<HostPattern>, addresses: Vec<IpAddr>) -> Self {
        Self {
            host: safe_url.host().to_string(),
            port: safe_url.port(),
            url: safe_url.as_str().to_string(),
            https: safe_url.is_https(),
            trusted_by,
            addresses,
        }
    }
}

/// Run every check and report why a URL was rejected, or what was verified.
///
/// Order, each step final on failure:
/// 1. Parse, scheme and credentials checks
/// 2. Hostname normalization
/// 3. Trusted-host override (allowlist), which skips everything below
/// 4. Static hostname blocklist
/// 5. Literal IPv4/IPv6 classification, or
/// 6. DNS resolution with every answer classified
///
/// # Errors
///
/// Returns the [`Error`] for the first step that failed; its
/// [`reason`](Error::reason) is the code [`check_url`] reports.
pub async fn inspect_url<'a, R>(
    input: impl Into<CheckInput<'a>>,
    config: &Config,
    resolver: &R,
) -> Result<Inspection, Error>
where
    R: Resolver + ?Sized,
{
    let safe_url = input.into().into_safe_url()?;
    let host = safe_url.host();

    if let Some(grant) = config.trusted_override(host) {
        tracing::info!(
            host = %host,
            pattern = %grant.pattern(),
            "trusted-host override, skipping blocklist, IP and DNS checks"
        );
        return Ok(Inspection::new(&safe_url, Some(grant.pattern().clone()), Vec::new()));
    }

    if let Some(rule) = is_hostname_blocked(host.as_str()) {
        return Err(Error::hostname_blocked(host.as_str(), rule));
    }

    let addresses = match IpLiteral::detect(host.as_str()) {
        Some(literal) => {
            let ip = literal
                .check()
                .map_err(|reason| Error::ip_blocked(host.as_str(), reason))?;
            vec![ip]
        }
        None => check_resolved_host(host, resolver).await?,
    };

    Ok(Inspection::new(&safe_url, None, addresses))
}

/// Check a URL, resolving hostnames with `resolver`.
pub async fn check_url_with<'a, R>(input: impl Into<CheckInput<'a>>, config: &Config, resolver: &R) -> Verdict
where
    R: Resolver + ?Sized,
{
    match inspect_url(input, config, resolver).await {
        Ok(_) => Verdict::allow(),
        Err(e) => {
            tracing::debug!(reason = %e.reason(), error = %e, "url rejected");
            Verdict::deny(e.reason())
        }
    }
}

/// Check a URL, resolving hostnames with the system resolver.
///
/// This is the primary entry point.
///
/// # Example
///
/// ```rust,no_run
/// use ssrf_gate::{check_url, Config, ReasonCode};
///
/// # async fn example() {
/// let config = Config::new(true, "*.docs.example.com");
///
/// let verdict = check_url("http://169.254.169.254/latest/meta-data/", &config).await;
/// assert!(!verdict.allowed);
/// assert_eq!(verdict.reason, Some(ReasonCode::IpBlocked));
/// # }
/// ```
pub async fn check_url<'a>(input: impl Into<CheckInput<'a>>, config: &Config) -> Verdict {
    check_url_with(input, config, &SystemResolver::new()).await
}

/// Synchronous version of [`check_url`].
///
/// Blocks the current thread for the DNS lookup. Works inside and outside a
/// Tokio runtime.
pub fn check_url_sync<'a>(input: impl Into<CheckInput<'a>>, config: &Config) -> Verdict {
    let input = input.into();
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(|| handle.block_on(check_url(input, config)))
        }
        // block_in_place panics on a current-thread runtime, so run the
        // check on a helper thread with a runtime of its own.
        Ok(_) => std::thread::scope(|s| {
            s.spawn(move || block_on_fresh_runtime(input, config))
                .join()
                .unwrap_or_else(|_| Verdict::deny(ReasonCode::DnsLookupFailed))
        }),
        Err(_) => block_on_fresh_runtime(input, config),
    }
}

fn block_on_fresh_runtime(input: CheckInput<'_>, config: &Config) -> Verdict {
    match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt.block_on(check_url(input, config)),
        Err(e) => {
            tracing::error!(error = %e, "failed to start runtime for DNS lookup");
            Verdict::deny(ReasonCode::DnsLookupFailed)
        }
    }
}
