//! Per-call cancellation and deadline.

use crate::errors::{XMattersError, XMattersResult};
use std::future::{pending, Future};
use std::time::Duration;
use tokio::time::{sleep, sleep_until, Instant};
use tokio_util::sync::CancellationToken;

/// Cancellation token and deadline carried through one logical call.
///
/// Every suspension point of a call (rate-limiter wait, network attempt,
/// retry sleep, next page) races against this context. The default context
/// never cancels and never expires.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    deadline: Option<Instant>,
    cancel: Option<CancellationToken>,
}

impl RequestContext {
    /// A context without deadline or cancellation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Expire `timeout` from now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Expire at `deadline`.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Observe `token` for cancellation.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// The deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fails fast if the context is already done.
    pub fn check(&self) -> XMattersResult<()> {
        if self.cancel.as_ref().is_some_and(|t| t.is_cancelled()) {
            return Err(XMattersError::Cancelled);
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(XMattersError::DeadlineExceeded);
        }
        Ok(())
    }

    /// Drives `future` until it completes or the context is done.
    pub async fn run<T, F>(&self, future: F) -> XMattersResult<T>
    where
        F: Future<Output = XMattersResult<T>>,
    {
        self.check()?;

        let cancelled = async {
            match &self.cancel {
                Some(token) => token.cancelled().await,
                None => pending::<()>().await,
            }
        };
        let expired = async {
            match self.deadline {
                Some(deadline) => sleep_until(deadline).await,
                None => pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = cancelled => Err(XMattersError::Cancelled),
            _ = expired => Err(XMattersError::DeadlineExceeded),
            result = future => result,
        }
    }

    /// Sleeps for `duration` unless the context finishes first.
    pub async fn sleep(&self, duration: Duration) -> XMattersResult<()> {
        self.run(async {
            sleep(duration).await;
            Ok(())
        })
        .await
    }
}
