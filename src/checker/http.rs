// src/checker/http.rs
// =============================================================================
// This module checks if a single URL is alive by making HTTP requests.
//
// Key functionality:
// - Makes an HTTP HEAD request first (lightweight, no body download)
// - Escalates to one GET when HEAD answers with a status >= 400
//   (plenty of servers reject HEAD but serve GET just fine)
// - Maps transport failures (timeout, TLS, connect) to Broken outcomes
//
// The probe is a small state machine:
//
//   HEAD ──< 400──────────────> Valid
//     │ >= 400 ──> GET ──< 400─> Valid
//     │              └─>= 400─> Broken(HTTP error)
//     └─ transport error ─────> Broken(cause)
//
// Every branch ends in a Verdict, and every Verdict maps to exactly one
// ProbeOutcome. Nothing in here returns an error: a dead link is data.
// =============================================================================

use std::error::Error as _;
use std::time::Duration;

use reqwest::{redirect, Client, Method, StatusCode};
use tracing::info;

use crate::error::ConfigError;

// Some servers block non-browser clients, so we look like one
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

const MAX_REDIRECTS: usize = 10;

/// The final classification of a link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    /// Server answered with a status below 400
    Valid,
    /// HTTP error status or transport failure
    Broken,
    /// Not an http(s) URL, never requested
    Skipped,
}

/// The result of probing one URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub url: String,
    pub status: LinkStatus,
    /// Final HTTP status code, if the server answered at all
    pub status_code: Option<u16>,
    /// Human-readable reason ("HTTP 200", "Timeout after 5s", ...)
    pub detail: String,
}

impl ProbeOutcome {
    /// Outcome for a URL the prober refuses to request
    pub fn skipped(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: LinkStatus::Skipped,
            status_code: None,
            detail: "non-HTTP scheme".to_string(),
        }
    }
}

/// Returns true for URLs the prober is willing to request
pub fn is_http_url(url: &str) -> bool {
    let lower = url.get(..8).unwrap_or(url).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

// Terminal states of the probe state machine
#[derive(Debug, PartialEq, Eq)]
enum Verdict {
    Reachable(StatusCode),
    HttpError(StatusCode),
    Timeout,
    Tls,
    Connect,
    Other(String),
}

/// Checks single URLs with a shared, pooled HTTP client
///
/// Cloning a `Prober` is cheap: the underlying `reqwest::Client` is
/// reference-counted.
#[derive(Debug, Clone)]
pub struct Prober {
    client: Client,
    timeout: Duration,
}

impl Prober {
    /// Builds a prober whose every request (HEAD and GET alike) is bounded
    /// by `timeout`
    pub fn new(timeout: Duration) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(ConfigError::HttpClient)?;

        Ok(Self { client, timeout })
    }

    /// Probes one URL and classifies the result
    pub async fn probe(&self, url: &str) -> ProbeOutcome {
        if !is_http_url(url) {
            return ProbeOutcome::skipped(url);
        }

        let verdict = match self.send(Method::HEAD, url).await {
            Ok(status) if status.as_u16() < 400 => Verdict::Reachable(status),
            Ok(_) => self.escalate(url).await,
            Err(e) => classify_error(&e),
        };

        let outcome = self.outcome(url, verdict);
        info!(
            url,
            status = ?outcome.status,
            detail = %outcome.detail,
            "probed link"
        );
        outcome
    }

    // HEAD was rejected; the GET result is authoritative
    async fn escalate(&self, url: &str) -> Verdict {
        match self.send(Method::GET, url).await {
            Ok(status) if status.as_u16() < 400 => Verdict::Reachable(status),
            Ok(status) => Verdict::HttpError(status),
            Err(e) => classify_error(&e),
        }
    }

    // Only the status matters, so the body (if any) is dropped unread
    async fn send(&self, method: Method, url: &str) -> Result<StatusCode, reqwest::Error> {
        let response = self.client.request(method, url).send().await?;
        Ok(response.status())
    }

    fn outcome(&self, url: &str, verdict: Verdict) -> ProbeOutcome {
        let (status, status_code, detail) = match verdict {
            Verdict::Reachable(code) => (
                LinkStatus::Valid,
                Some(code.as_u16()),
                format!("HTTP {}", code.as_u16()),
            ),
            Verdict::HttpError(code) => (
                LinkStatus::Broken,
                Some(code.as_u16()),
                format!("HTTP Error: {}", code.as_u16()),
            ),
            Verdict::Timeout => (
                LinkStatus::Broken,
                None,
                format!("Timeout after {}s", self.timeout.as_secs()),
            ),
            Verdict::Tls => (LinkStatus::Broken, None, "SSL Certificate Error".to_string()),
            Verdict::Connect => (LinkStatus::Broken, None, "Connection Error".to_string()),
            Verdict::Other(message) => (LinkStatus::Broken, None, message),
        };

        ProbeOutcome {
            url: url.to_string(),
            status,
            status_code,
            detail,
        }
    }
}

// Categorizes reqwest errors
//
// TLS failures happen while connecting, so reqwest also flags them as
// connect errors; look for them first by walking the source chain.
fn classify_error(error: &reqwest::Error) -> Verdict {
    if error.is_timeout() {
        Verdict::Timeout
    } else if is_tls_error(error) {
        Verdict::Tls
    } else if error.is_connect() {
        Verdict::Connect
    } else {
        Verdict::Other(error.to_string())
    }
}

fn is_tls_error(error: &reqwest::Error) -> bool {
    let mut source = error.source();
    while let Some(cause) = source {
        let message = cause.to_string().to_ascii_lowercase();
        if ["certificate", "tls", "ssl", "handshake"]
            .iter()
            .any(|needle| message.contains(needle))
        {
            return true;
        }
        source = cause.source();
    }
    false
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why HEAD first?
//    - HEAD asks for headers only, so nothing is downloaded
//    - Some servers answer HEAD with 403/405 even though the page exists,
//      which is why a >= 400 answer gets a second chance with GET
//
// 2. Why doesn't a HEAD timeout fall back to GET?
//    - A server that doesn't answer HEAD in time is very unlikely to answer
//      GET in time, and it would double the wait on every dead host
//
// 3. Why is the timeout set on the Client?
//    - Client::builder().timeout() bounds the whole request, redirects
//      included, so a stuck server can't hold a pool slot forever
// -----------------------------------------------------------------------------
