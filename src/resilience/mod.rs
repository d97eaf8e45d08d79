//! Resilience patterns for the xMatters client.
//!
//! Every logical request first waits for the shared rate limiter, then runs
//! through the retry executor. The limiter is consulted once per logical
//! call; retries reuse that slot.

mod rate_limiter;
mod retry;

pub use rate_limiter::RateLimiter;
pub use retry::RetryExecutor;

use crate::client::context::RequestContext;
use crate::config::{RateLimitConfig, RetryConfig};
use crate::errors::XMattersResult;
use crate::observability::Metrics;
use crate::transport::HttpResponse;
use std::future::Future;
use std::sync::Arc;

/// Resilience orchestrator combining rate limiting and retry.
#[derive(Debug)]
pub struct ResilienceOrchestrator {
    rate_limiter: RateLimiter,
    retry: RetryExecutor,
    metrics: Arc<Metrics>,
}

impl ResilienceOrchestrator {
    /// Creates a new resilience orchestrator.
    pub fn new(retry: RetryConfig, rate_limit: &RateLimitConfig, metrics: Arc<Metrics>) -> Self {
        let rate_limiter = if rate_limit.enabled {
            RateLimiter::new(rate_limit.requests_per_second)
        } else {
            RateLimiter::unlimited()
        };

        Self {
            rate_limiter,
            retry: RetryExecutor::new(retry).with_metrics(metrics.clone()),
            metrics,
        }
    }

    /// Gets the rate limiter.
    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    /// Gets the retry executor.
    pub fn retry(&self) -> &RetryExecutor {
        &self.retry
    }

    /// Executes one logical request with all resilience patterns.
    pub async fn execute<F, Fut>(
        &self,
        ctx: &RequestContext,
        attempt: F,
    ) -> XMattersResult<HttpResponse>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = XMattersResult<HttpResponse>>,
    {
        let waited = ctx
            .run(async { Ok(self.rate_limiter.acquire().await) })
            .await?;
        if !waited.is_zero() {
            self.metrics.record_throttled();
        }

        self.retry.execute(ctx, attempt).await
    }
}
