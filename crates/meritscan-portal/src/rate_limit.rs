//! Global request rate limiting using a token bucket.
//!
//! One [`RateLimiter`] is shared by every portal session of a run. Each portal
//! request takes one token; tokens refill continuously at the configured rate
//! up to a burst capacity of `max(1, rate)`. Rates below
//! [`MIN_RATE_PER_SEC`] are raised to it, so no wait exceeds 1000 seconds.
//!
//! Waiters are served in order: the bucket sits behind a fair
//! `tokio::sync::Mutex` that is held while a waiter sleeps for its token.

use meritscan_core::MIN_RATE_PER_SEC;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Shared requests-per-second ceiling. Cloning shares the same bucket.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    rate: Option<f64>,
    bucket: Option<Arc<Mutex<Bucket>>>,
}

#[derive(Debug)]
struct Bucket {
    rate: f64,
    capacity: f64,
    tokens: f64,
    last_refill: Instant,
}

impl Bucket {
    fn refill(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.rate).min(self.capacity);
        self.last_refill = now;
    }
}

impl RateLimiter {
    /// Create a limiter allowing `requests_per_sec` requests per second.
    ///
    /// `None`, zero, negative or non-finite rates mean unlimited.
    #[must_use]
    pub fn new(requests_per_sec: Option<f64>) -> Self {
        let rate = requests_per_sec
            .filter(|rate| rate.is_finite() && *rate > 0.0)
            .map(|rate| rate.max(MIN_RATE_PER_SEC));
        let bucket = rate.map(|rate| {
            let capacity = rate.max(1.0);
            Arc::new(Mutex::new(Bucket {
                rate,
                capacity,
                tokens: capacity,
                last_refill: Instant::now(),
            }))
        });

        Self { rate, bucket }
    }

    /// A limiter that never waits.
    #[must_use]
    pub fn unlimited() -> Self {
        Self {
            rate: None,
            bucket: None,
        }
    }

    /// Configured rate, `None` if unlimited.
    #[must_use]
    pub fn rate(&self) -> Option<f64> {
        self.rate
    }

    /// Wait until one request may be sent.
    pub async fn acquire(&self) {
        let Some(bucket) = &self.bucket else {
            return;
        };

        let mut bucket = bucket.lock().await;
        bucket.refill(Instant::now());

        if bucket.tokens < 1.0 {
            let deficit = 1.0 - bucket.tokens;
            let wait = Duration::try_from_secs_f64(deficit / bucket.rate)
                .unwrap_or(Duration::from_secs(1000));
            tracing::trace!(wait_ms = wait.as_millis(), "Rate limit reached, waiting");
            tokio::time::sleep(wait).await;
            bucket.refill(Instant::now());
        }

        bucket.tokens = (bucket.tokens - 1.0).max(0.0);
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::unlimited()
    }
}
