//! The single choke-point for outbound requests.

use std::future::Future;
use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::catalog::Query;
use crate::rate_limit::{RateLimit, RateLimitError, RateLimiter};
use crate::{DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, EUVD_API_BASE_URL, http_client_with_timeout};

/// Stable classification of a [`FetchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchErrorKind {
    RateLimitWaitFailed,
    Transport,
    Status,
    Decode,
}

impl FetchErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RateLimitWaitFailed => "rate_limit_wait_failed",
            Self::Transport => "transport_error",
            Self::Status => "non_200_status",
            Self::Decode => "decode_error",
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    /// No permit was granted; nothing was sent.
    #[error("rate limit error: {0}")]
    RateLimit(#[from] RateLimitError),
    /// DNS, connect, timeout, or body read failure.
    #[error("http error for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// Any status other than 200. The body is not decoded.
    #[error("bad response from {url}: {status}")]
    Status { url: String, status: StatusCode },
    /// Malformed JSON, or JSON that does not fit the expected shape.
    #[error("json decode error for {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    #[must_use]
    pub const fn kind(&self) -> FetchErrorKind {
        match self {
            Self::RateLimit(_) => FetchErrorKind::RateLimitWaitFailed,
            Self::Transport { .. } => FetchErrorKind::Transport,
            Self::Status { .. } => FetchErrorKind::Status,
            Self::Decode { .. } => FetchErrorKind::Decode,
        }
    }

    /// HTTP status, for [`FetchError::Status`] only.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Construction parameters for a [`Fetcher`].
#[derive(Debug, Clone)]
pub struct FetcherOptions {
    /// API root; endpoint routes are appended verbatim.
    pub base_url: String,
    /// Total per-request timeout: connect, transfer, and body read.
    pub timeout: Duration,
    pub user_agent: String,
    pub rate_limit: RateLimit,
}

impl Default for FetcherOptions {
    fn default() -> Self {
        Self {
            base_url: EUVD_API_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            rate_limit: RateLimit::EUVD,
        }
    }
}

/// Rate limiter, HTTP GET and JSON decode composed into one operation.
///
/// Every call issues exactly one request, after exactly one permit, and
/// reports the first failure to the caller without retrying.
#[derive(Debug)]
pub struct Fetcher {
    client: reqwest::Client,
    base_url: String,
    limiter: RateLimiter,
}

impl Fetcher {
    pub fn new(options: FetcherOptions) -> Result<Self, reqwest::Error> {
        let client = http_client_with_timeout(options.timeout, &options.user_agent)?;
        Ok(Self::with_client(client, &options.base_url, RateLimiter::new(options.rate_limit)))
    }

    /// Assemble a fetcher from prebuilt parts.
    #[must_use]
    pub fn with_client(client: reqwest::Client, base_url: &str, limiter: RateLimiter) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            limiter,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Run a catalog query and decode into its declared shape.
    pub async fn query<Q: Query>(&self, query: &Q) -> Result<Q::Response, FetchError> {
        self.fetch(&query.path()).await
    }

    /// GET `base_url + path` and decode the body as `T`.
    pub async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        self.fetch_or_cancel(path, std::future::pending::<()>()).await
    }

    pub async fn fetch_or_cancel<T, F>(&self, path: &str, cancelled: F) -> Result<T, FetchError>
    where
        T: DeserializeOwned,
        F: Future<Output = ()>,
    {
        self.limiter.acquire_or_cancel(cancelled).await?;

        let url = format!("{}{path}", self.base_url);
        tracing::debug!(%url, "GET");

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(source) => return Err(FetchError::Transport { url, source }),
        };

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status { url, status });
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(source) => return Err(FetchError::Transport { url, source }),
        };

        serde_json::from_slice(&body).map_err(|source| FetchError::Decode { url, source })
    }
}
