//! Rate limiter using a token bucket with a capacity of one.

use parking_lot::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Token bucket state.
///
/// Tokens may go negative: each acquisition reserves the next free slot, so
/// concurrent callers queue up one interval apart instead of racing.
#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
    refill_rate: f64,
    capacity: f64,
}

impl TokenBucket {
    fn new(refill_rate: f64) -> Self {
        Self {
            tokens: 1.0,
            last_refill: Instant::now(),
            refill_rate,
            capacity: 1.0,
        }
    }

    fn refill(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.refill_rate).min(self.capacity);
        self.last_refill = now;
    }

    /// Takes one token and returns how long the caller must wait for it.
    ///
    /// Waits too long to represent saturate at `Duration::MAX`.
    fn reserve(&mut self, now: Instant) -> Duration {
        self.refill(now);
        self.tokens -= 1.0;
        if self.tokens >= 0.0 {
            Duration::ZERO
        } else {
            Duration::try_from_secs_f64(-self.tokens / self.refill_rate).unwrap_or(Duration::MAX)
        }
    }
}

/// Serializes outbound requests to a steady rate with no bursting.
///
/// `acquire` never fails; it only delays.
#[derive(Debug)]
pub struct RateLimiter {
    bucket: Option<Mutex<TokenBucket>>,
}

impl RateLimiter {
    /// Creates a limiter admitting `requests_per_second` calls.
    pub fn new(requests_per_second: f64) -> Self {
        Self {
            bucket: Some(Mutex::new(TokenBucket::new(requests_per_second))),
        }
    }

    /// Creates a limiter that never waits.
    pub fn unlimited() -> Self {
        Self { bucket: None }
    }

    /// Reserves a slot without waiting for it.
    pub fn reserve(&self) -> Duration {
        match &self.bucket {
            Some(bucket) => bucket.lock().reserve(Instant::now()),
            None => Duration::ZERO,
        }
    }

    /// Waits until a token is available. Returns the time spent waiting.
    pub async fn acquire(&self) -> Duration {
        let wait = self.reserve();
        if !wait.is_zero() {
            debug!(wait_ms = wait.as_millis() as u64, "Waiting for rate limit");
            tokio::time::sleep(wait).await;
        }
        wait
    }
}
