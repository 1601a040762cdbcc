//! Token-bucket pacing for outbound requests.
//!
//! The EUVD service expects strictly sequential, slow traffic. Every request
//! the client issues first takes a permit from a [`RateLimiter`]; a caller
//! without a permit sleeps until the next refill or until its cancellation
//! signal fires.
//!
//! # Guarantee
//!
//! Over any window of wall-clock time, the number of grants never exceeds
//! `floor(window / interval) + burst`. With the EUVD defaults (6 s, burst 1)
//! that is one request per six seconds regardless of how many callers share
//! the limiter.

use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;

/// Pacing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    /// Time to earn one permit.
    pub interval: Duration,
    /// Maximum permits held at once. Zero is treated as one.
    pub burst: u32,
}

impl RateLimit {
    /// One request per six seconds, no bursting.
    pub const EUVD: Self = Self {
        interval: Duration::from_secs(6),
        burst: 1,
    };

    /// No pacing at all.
    pub const UNLIMITED: Self = Self {
        interval: Duration::ZERO,
        burst: 1,
    };

    #[must_use]
    pub const fn new(interval: Duration, burst: u32) -> Self {
        Self { interval, burst }
    }

    const fn capacity(self) -> u32 {
        if self.burst == 0 { 1 } else { self.burst }
    }
}

impl Default for RateLimit {
    fn default() -> Self {
        Self::EUVD
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RateLimitError {
    #[error("cancelled while waiting for a request permit")]
    Cancelled,
}

#[derive(Debug)]
struct Bucket {
    tokens: u32,
    last_refill: Instant,
}

impl Bucket {
    fn refill(&mut self, now: Instant, limit: RateLimit) {
        let capacity = limit.capacity();
        if self.tokens >= capacity {
            // A full bucket does not bank time.
            self.last_refill = now;
            return;
        }

        let elapsed = now.saturating_duration_since(self.last_refill);
        let earned = elapsed.as_nanos() / limit.interval.as_nanos();
        if earned == 0 {
            return;
        }

        let earned = u32::try_from(earned).unwrap_or(u32::MAX);
        self.tokens = self.tokens.saturating_add(earned).min(capacity);
        if self.tokens == capacity {
            self.last_refill = now;
        } else {
            self.last_refill += limit.interval * earned;
        }
    }

    /// Take a permit, or report how long until the next one is earned.
    fn try_take(&mut self, now: Instant, limit: RateLimit) -> Result<(), Duration> {
        if limit.interval.is_zero() {
            return Ok(());
        }

        self.refill(now, limit);
        if self.tokens > 0 {
            self.tokens -= 1;
            return Ok(());
        }

        let elapsed = now.saturating_duration_since(self.last_refill);
        Err(limit.interval.saturating_sub(elapsed))
    }
}

/// Shared request pacer.
///
/// Construct one per process and hand it to the [`Fetcher`](crate::Fetcher);
/// the bucket state sits behind a mutex so concurrent callers stay within
/// the limit as well.
#[derive(Debug)]
pub struct RateLimiter {
    limit: RateLimit,
    bucket: Mutex<Bucket>,
}

impl RateLimiter {
    /// Create a limiter holding a full bucket.
    #[must_use]
    pub fn new(limit: RateLimit) -> Self {
        Self {
            limit,
            bucket: Mutex::new(Bucket {
                tokens: limit.capacity(),
                last_refill: Instant::now(),
            }),
        }
    }

    #[must_use]
    pub fn limit(&self) -> RateLimit {
        self.limit
    }

    /// Wait for a permit. Never fails.
    pub async fn acquire(&self) {
        // `pending` never resolves, so the only way out is a grant.
        let _ = self.acquire_or_cancel(std::future::pending::<()>()).await;
    }

    /// Wait for a permit unless `cancelled` resolves first.
    ///
    /// A signal that has already fired wins over an available permit, and a
    /// cancelled wait consumes nothing.
    pub async fn acquire_or_cancel<F>(&self, cancelled: F) -> Result<(), RateLimitError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(cancelled);

        loop {
            tokio::select! {
                biased;
                () = &mut cancelled => return Err(RateLimitError::Cancelled),
                () = std::future::ready(()) => {}
            }

            let wait = {
                let mut bucket = self.bucket.lock().unwrap_or_else(PoisonError::into_inner);
                match bucket.try_take(Instant::now(), self.limit) {
                    Ok(()) => return Ok(()),
                    Err(wait) => wait,
                }
            };

            tracing::debug!(
                wait_ms = wait.as_millis(),
                "Request permit unavailable; waiting for refill"
            );

            tokio::select! {
                biased;
                () = &mut cancelled => return Err(RateLimitError::Cancelled),
                () = tokio::time::sleep(wait) => {}
            }
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimit::EUVD)
    }
}
