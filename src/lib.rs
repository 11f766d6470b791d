//! # ssrf-gate
//!
//! Pre-flight SSRF gate for agent-directed fetches.
//!
//! `ssrf-gate` decides whether a URL is safe to hand to an HTTP client that
//! runs with backend privileges. It checks the URL's structure, the
//! hostname, literal IP addresses, and every address the hostname currently
//! resolves to (DNS rebinding protection). It never makes the request
//! itself and keeps no state between calls.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ssrf_gate::{check_url, Config};
//!
//! # async fn example() {
//! let config = Config::default();
//! let verdict = check_url("https://example.com/api", &config).await;
//! if !verdict.allowed {
//!     eprintln!("refusing to fetch: {}", verdict.reason.unwrap());
//! }
//! # }
//! ```
//!
//! ## Trusted hosts
//!
//! An enabled allowlist is a hard override: a matching host skips the
//! blocklist, IP and DNS checks entirely. See [`TrustedHostOverride`].

mod allowlist;
mod blocklist;
mod check;
mod config;
mod error;
mod hostname;
mod ip;
mod ipv4;
mod ipv6;
mod resolve;
mod safe_url;
mod verdict;

pub use allowlist::{Allowlist, HostPattern, TrustedHostOverride};
pub use blocklist::is_hostname_blocked;
pub use check::{check_url, check_url_sync, check_url_with, inspect_url, CheckInput, Inspection};
pub use config::Config;
pub use error::Error;
pub use hostname::{normalize_hostname, NormalizedHost};
pub use ip::{is_ip_blocked, Parsed};
pub use ipv4::{classify_ipv4, in_cidr, is_blocked_ipv4, parse_ipv4};
pub use ipv6::{classify_ipv6, format_ipv6, is_blocked_ipv6, parse_ipv6};
pub use resolve::{check_resolved_host, ResolveError, Resolver, SystemResolver};
pub use safe_url::SafeUrl;
pub use verdict::{ReasonCode, UnknownReasonCode, Verdict};

pub use async_trait::async_trait;
