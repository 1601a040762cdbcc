//! Rate-limited, typed client for the EU Vulnerability Database API.
//!
//! # Architecture
//!
//! Every request passes through one [`Fetcher`]:
//!
//! ```text
//! caller -> Fetcher::query(&Q) -> RateLimiter (gate) -> HTTP GET -> JSON decode -> Q::Response
//! ```
//!
//! - [`rate_limit`] - token bucket; 6 s interval, burst 1 for the public service
//! - [`catalog`] - the seven endpoints, their routes and response shapes
//! - [`fetch`] - the fetcher and its error taxonomy
//!
//! # Error Handling
//!
//! [`FetchError`] distinguishes a cancelled rate-limit wait, transport
//! failures, non-200 statuses and decode failures. Nothing is retried; the
//! caller decides what a failure means.

pub mod catalog;
pub mod fetch;
pub mod rate_limit;

use std::time::Duration;

pub use catalog::{
    AdvisoryLookup, CATALOG, CriticalVulnerabilities, EndpointDescriptor, EndpointKind,
    EnisaLookup, ExploitedVulnerabilities, LatestVulnerabilities, Query, TextSearch,
    VulnerabilityLookup,
};
pub use fetch::{FetchError, FetchErrorKind, Fetcher, FetcherOptions};
pub use rate_limit::{RateLimit, RateLimitError, RateLimiter};

pub use euvd_types;

/// Public EUVD API root.
pub const EUVD_API_BASE_URL: &str = "https://euvdservices.enisa.europa.eu/api";

/// Total budget for one request, covering connect, transfer and body read.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub const DEFAULT_USER_AGENT: &str = concat!("euvd/", env!("CARGO_PKG_VERSION"));

const TCP_KEEPALIVE_SECS: u64 = 60;
const POOL_IDLE_TIMEOUT_SECS: u64 = 90;

fn base_client_builder(user_agent: &str) -> reqwest::ClientBuilder {
    use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};

    let mut default_headers = HeaderMap::new();
    default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    reqwest::Client::builder()
        .user_agent(user_agent)
        .tcp_keepalive(Some(Duration::from_secs(TCP_KEEPALIVE_SECS)))
        .pool_idle_timeout(Some(Duration::from_secs(POOL_IDLE_TIMEOUT_SECS)))
        .default_headers(default_headers)
}

pub fn http_client_with_timeout(
    timeout: Duration,
    user_agent: &str,
) -> Result<reqwest::Client, reqwest::Error> {
    base_client_builder(user_agent).timeout(timeout).build()
}
