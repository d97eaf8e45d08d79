//! Observability: request metrics and tracing hooks.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error};

/// Metrics collector for xMatters API operations.
#[derive(Debug, Default)]
pub struct Metrics {
    requests_total: AtomicU64,
    requests_success: AtomicU64,
    requests_failed: AtomicU64,
    /// Extra attempts made by the retry layer.
    requests_retried: AtomicU64,
    /// Calls that had to wait for the rate limiter.
    requests_throttled: AtomicU64,
    pages_fetched: AtomicU64,
    latency_total_us: AtomicU64,
    latency_count: AtomicU64,
}

impl Metrics {
    /// Creates a new metrics collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a request.
    pub fn record_request(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a successful request.
    pub fn record_success(&self) {
        self.requests_success.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a failed request.
    pub fn record_failure(&self) {
        self.requests_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a retried attempt.
    pub fn record_retry(&self) {
        self.requests_retried.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a call delayed by the rate limiter.
    pub fn record_throttled(&self) {
        self.requests_throttled.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a fetched page.
    pub fn record_page(&self) {
        self.pages_fetched.fetch_add(1, Ordering::Relaxed);
    }

    /// Records request latency.
    pub fn record_latency(&self, duration: Duration) {
        let us = duration.as_micros() as u64;
        self.latency_total_us.fetch_add(us, Ordering::Relaxed);
        self.latency_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Gets the average latency in microseconds.
    pub fn average_latency_us(&self) -> u64 {
        let total = self.latency_total_us.load(Ordering::Relaxed);
        let count = self.latency_count.load(Ordering::Relaxed);
        if count == 0 {
            0
        } else {
            total / count
        }
    }

    /// Gets a snapshot of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_total: self.requests_total.load(Ordering::Relaxed),
            requests_success: self.requests_success.load(Ordering::Relaxed),
            requests_failed: self.requests_failed.load(Ordering::Relaxed),
            requests_retried: self.requests_retried.load(Ordering::Relaxed),
            requests_throttled: self.requests_throttled.load(Ordering::Relaxed),
            pages_fetched: self.pages_fetched.load(Ordering::Relaxed),
            average_latency_us: self.average_latency_us(),
        }
    }
}

/// A snapshot of metrics at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Logical requests issued.
    pub requests_total: u64,
    /// Requests that returned a 200/201 body.
    pub requests_success: u64,
    /// Requests that ended in any error, sentinels included.
    pub requests_failed: u64,
    /// Extra attempts made by the retry layer.
    pub requests_retried: u64,
    /// Requests that waited for the rate limiter.
    pub requests_throttled: u64,
    /// Pages fetched by the pagination walker.
    pub pages_fetched: u64,
    /// Average latency in microseconds.
    pub average_latency_us: u64,
}

/// Request timer for measuring latency.
pub struct RequestTimer {
    start: Instant,
    metrics: Arc<Metrics>,
}

impl RequestTimer {
    /// Starts timing and counts the request.
    pub fn start(metrics: Arc<Metrics>) -> Self {
        metrics.record_request();
        Self {
            start: Instant::now(),
            metrics,
        }
    }

    /// Records success and latency.
    pub fn success(self) {
        self.metrics.record_success();
        self.metrics.record_latency(self.start.elapsed());
    }

    /// Records failure and latency.
    pub fn failure(self) {
        self.metrics.record_failure();
        self.metrics.record_latency(self.start.elapsed());
    }

    /// Gets elapsed time without recording.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Tracing hooks for xMatters API operations.
pub struct TracingHooks;

impl TracingHooks {
    /// Logs the start of an API request.
    pub fn on_request_start(method: &str, path: &str) {
        debug!(method = %method, path = %path, "xMatters API request started");
    }

    /// Logs the completion of an API request.
    pub fn on_request_complete(method: &str, path: &str, status: u16, duration: Duration) {
        debug!(
            method = %method,
            path = %path,
            status = status,
            duration_ms = duration.as_millis() as u64,
            "xMatters API request completed"
        );
    }

    /// Logs a request error.
    pub fn on_request_error(method: &str, path: &str, error: &str) {
        error!(method = %method, path = %path, error = %error, "xMatters API request failed");
    }

    /// Logs one fetched page.
    pub fn on_page(path: &str, page: u64, items: usize, has_next: bool) {
        debug!(path = %path, page = page, items = items, has_next = has_next, "Fetched page");
    }
}

/// Sensitive headers that should be redacted in logs.
pub const SENSITIVE_HEADERS: &[&str] = &["authorization", "cookie", "set-cookie"];

/// Redacts sensitive values in headers.
pub fn redact_header(name: &str, value: &str) -> String {
    if SENSITIVE_HEADERS.contains(&name.to_lowercase().as_str()) {
        "[REDACTED]".to_string()
    } else {
        value.to_string()
    }
}
