//! Retry executor with bounded exponential backoff.

use crate::client::context::RequestContext;
use crate::config::RetryConfig;
use crate::errors::XMattersResult;
use crate::observability::Metrics;
use crate::transport::HttpResponse;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Replays one logical request until it succeeds, fails permanently, or the
/// retry ceiling is reached.
///
/// An attempt is retried when it fails at the transport level or the server
/// answers with one of the configured retryable statuses. When the ceiling is
/// reached the last outcome is handed back unchanged, so a final 503 still
/// reaches the response classifier.
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    config: RetryConfig,
    metrics: Option<Arc<Metrics>>,
}

impl RetryExecutor {
    /// Creates a new retry executor.
    pub fn new(config: RetryConfig) -> Self {
        Self {
            config,
            metrics: None,
        }
    }

    /// Counts retries into `metrics`.
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Gets the retry configuration.
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Delay before the `retry`-th retry (1-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 1u32
            .checked_shl(retry.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.config
            .min_retry_delay
            .saturating_mul(factor)
            .min(self.config.max_retry_delay)
    }

    /// Whether `outcome` warrants another attempt.
    pub fn should_retry(&self, outcome: &XMattersResult<HttpResponse>) -> bool {
        match outcome {
            Ok(response) => self
                .config
                .retryable_statuses
                .contains(&response.status.as_u16()),
            Err(e) => e.is_retryable(),
        }
    }

    fn delay_for(&self, outcome: &XMattersResult<HttpResponse>, retry: u32) -> Duration {
        match outcome {
            Ok(response) => response
                .retry_after()
                .map(|d| d.min(self.config.max_retry_delay))
                .unwrap_or_else(|| self.backoff(retry)),
            Err(_) => self.backoff(retry),
        }
    }

    /// Executes `attempt` with retries. The closure receives the zero-based
    /// attempt number.
    pub async fn execute<F, Fut>(
        &self,
        ctx: &RequestContext,
        mut attempt: F,
    ) -> XMattersResult<HttpResponse>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = XMattersResult<HttpResponse>>,
    {
        let mut retries = 0;

        loop {
            let outcome = ctx.run(attempt(retries)).await;

            if retries >= self.config.max_retries || !self.should_retry(&outcome) {
                return outcome;
            }

            retries += 1;
            let delay = self.delay_for(&outcome, retries);
            let reason = match &outcome {
                Ok(response) => format!("status {}", response.status.as_u16()),
                Err(e) => e.to_string(),
            };

            warn!(
                attempt = retries,
                max_retries = self.config.max_retries,
                delay_ms = delay.as_millis() as u64,
                reason = %reason,
                "Retrying xMatters API request"
            );
            if let Some(ref metrics) = self.metrics {
                metrics.record_retry();
            }

            ctx.sleep(delay).await?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{TransportErrorKind, XMattersError};
    use bytes::Bytes;
    use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER};
    use reqwest::StatusCode;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;
    use tokio_util::sync::CancellationToken;

    fn response(status: u16) -> HttpResponse {
        HttpResponse::new(
            StatusCode::from_u16(status).unwrap(),
            HeaderMap::new(),
            Bytes::from_static(b"{}"),
        )
    }

    fn executor(max_retries: u32) -> RetryExecutor {
        RetryExecutor::new(RetryConfig::from_secs(max_retries, 1, 30))
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let executor = executor(10);
        let delays: Vec<u64> = (1..=7).map(|n| executor.backoff(n).as_secs()).collect();
        assert_eq!(delays, vec![1, 2, 4, 8, 16, 30, 30]);
        assert_eq!(executor.backoff(64), Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_transient_failures() {
        let executor = executor(4);
        let calls = AtomicU32::new(0);

        let result = executor
            .execute(&RequestContext::new(), |_| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 3 {
                        Ok(response(503))
                    } else {
                        Ok(response(200))
                    }
                }
            })
            .await
            .unwrap();

        assert_eq!(result.status, StatusCode::OK);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_returns_last_response() {
        let executor = executor(2);
        let calls = AtomicU32::new(0);
        let start = Instant::now();

        let result = executor
            .execute(&RequestContext::new(), |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(response(500)) }
            })
            .await
            .unwrap();

        assert_eq!(result.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 1s + 2s of backoff
        assert!(start.elapsed() >= Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_errors_are_retried() {
        let metrics = Arc::new(Metrics::new());
        let executor = executor(3).with_metrics(metrics.clone());
        let calls = AtomicU32::new(0);

        let result = executor
            .execute(&RequestContext::new(), |_| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        Err(XMattersError::transport(
                            TransportErrorKind::Connect,
                            "connection refused",
                        ))
                    } else {
                        Ok(response(201))
                    }
                }
            })
            .await
            .unwrap();

        assert_eq!(result.status, StatusCode::CREATED);
        assert_eq!(metrics.snapshot().requests_retried, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_persistent_transport_errors_return_final_error() {
        let executor = executor(2);
        let calls = AtomicU32::new(0);

        let result = executor
            .execute(&RequestContext::new(), |_| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    Err(XMattersError::transport(
                        TransportErrorKind::Timeout,
                        format!("attempt {} timed out", n),
                    ))
                }
            })
            .await;

        match result {
            Err(XMattersError::Transport { kind, message }) => {
                assert_eq!(kind, TransportErrorKind::Timeout);
                assert_eq!(message, "attempt 2 timed out");
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let executor = executor(4);
        let calls = AtomicU32::new(0);

        let result = executor
            .execute(&RequestContext::new(), |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(response(400)) }
            })
            .await
            .unwrap();

        assert_eq!(result.status, StatusCode::BAD_REQUEST);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_retries_makes_one_attempt() {
        let executor = RetryExecutor::new(RetryConfig::disabled());
        let calls = AtomicU32::new(0);

        let result = executor
            .execute(&RequestContext::new(), |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(response(503)) }
            })
            .await
            .unwrap();

        assert_eq!(result.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_after_is_honoured() {
        let executor = executor(1);
        let calls = AtomicU32::new(0);
        let start = Instant::now();

        executor
            .execute(&RequestContext::new(), |_| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        let mut headers = HeaderMap::new();
                        headers.insert(RETRY_AFTER, HeaderValue::from_static("5"));
                        Ok(HttpResponse::new(
                            StatusCode::TOO_MANY_REQUESTS,
                            headers,
                            Bytes::new(),
                        ))
                    } else {
                        Ok(response(200))
                    }
                }
            })
            .await
            .unwrap();

        assert!(start.elapsed() >= Duration::from_secs(5));
        assert!(start.elapsed() < Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_backoff() {
        let executor = executor(4);
        let token = CancellationToken::new();
        let ctx = RequestContext::new().with_cancellation(token.clone());

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            token.cancel();
        });

        let result = executor
            .execute(&ctx, |_| async { Ok(response(503)) })
            .await;

        assert!(matches!(result, Err(XMattersError::Cancelled)));
        canceller.await.unwrap();
    }
}
