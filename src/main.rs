//! ssrf-gate CLI - check one URL before fetching it.
//!
//! Exit status: `0` allowed, `1` rejected (reason code on stdout),
//! `2` no URL given (`missing_url` on stdout).

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use ssrf_gate::{check_url_with, Config, SystemResolver, Verdict};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Printed when a rejection somehow carries no reason.
const FALLBACK_REASON: &str = "blocked";

#[derive(Parser)]
#[command(name = "ssrf-gate")]
#[command(about = "Decide whether a URL is safe for an agent to fetch")]
#[command(version)]
struct Cli {
    /// URL to check
    url: Option<String>,

    /// Let allowlisted hosts skip every other check
    #[arg(
        long,
        env = "SSRF_GATE_ALLOWLIST_ENABLED",
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    allowlist_enabled: bool,

    /// Trusted hosts, e.g. "example.com, *.internal.example.com"
    #[arg(long, env = "SSRF_GATE_ALLOWLIST", default_value = "")]
    allowlist: String,

    /// DNS lookup timeout in milliseconds
    #[arg(long, env = "SSRF_GATE_DNS_TIMEOUT_MS", default_value_t = 5000)]
    dns_timeout_ms: u64,

    /// Print the verdict as JSON instead of a bare reason code
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ssrf_gate=warn".into()),
        )
        .init();

    let cli = Cli::parse();

    let Some(url) = requested_url(&cli) else {
        println!("missing_url");
        return ExitCode::from(2);
    };

    let config = Config::new(cli.allowlist_enabled, &cli.allowlist);
    let resolver = SystemResolver::with_timeout(Duration::from_millis(cli.dns_timeout_ms));
    let verdict = check_url_with(url, &config, &resolver).await;

    if let Some(line) = render(&verdict, cli.json) {
        println!("{line}");
    }
    ExitCode::from(exit_code(&verdict))
}

/// The URL argument, treating a blank one as absent.
fn requested_url(cli: &Cli) -> Option<&str> {
    cli.url.as_deref().filter(|url| !url.trim().is_empty())
}

/// The single stdout line for a verdict, if any.
fn render(verdict: &Verdict, json: bool) -> Option<String> {
    if json {
        return Some(
            serde_json::to_string(verdict)
                .unwrap_or_else(|_| format!(r#"{{"allowed":{}}}"#, verdict.allowed)),
        );
    }
    if verdict.allowed {
        None
    } else {
        Some(
            verdict
                .reason
                .map_or(FALLBACK_REASON, |reason| reason.as_str())
                .to_string(),
        )
    }
}

fn exit_code(verdict: &Verdict) -> u8 {
    if verdict.allowed {
        0
    } else {
        1
    }
}
