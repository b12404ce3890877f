//! Retry logic.
//!
//! # Responsibilities
//! - Re-run the circuit breaker stage on transient failures
//! - Pause a fixed delay between attempts
//! - Surface the last error unchanged once attempts are exhausted
//!
//! # Design Decisions
//! - Transport, HTTP status and circuit-open errors are retryable
//! - Codec and configuration errors propagate on the first occurrence
//! - Delay is fixed, not exponential
//! - The delay only suspends the calling task

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use crate::error::HttpResult;
use crate::http::{Request, Response, Transport};
use crate::observability::metrics;

/// Retries the wrapped stage up to `max_retry_attempts` extra times.
#[derive(Debug)]
pub struct RetryPolicy<S> {
    inner: S,
    max_retry_attempts: u32,
    delay: Duration,
    client: Arc<str>,
}

impl<S> RetryPolicy<S> {
    pub fn new(client: Arc<str>, max_retry_attempts: u32, delay: Duration, inner: S) -> Self {
        Self {
            inner,
            max_retry_attempts,
            delay,
            client,
        }
    }

    #[cfg(test)]
    fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: Transport> Transport for RetryPolicy<S> {
    async fn execute(&self, request: &Request) -> HttpResult<Response> {
        let mut attempt = 0;
        loop {
            match self.inner.execute(request).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() && attempt < self.max_retry_attempts => {
                    attempt += 1;
                    tracing::warn!(
                        client = %self.client,
                        method = %request.method(),
                        url = %request.url(),
                        error = %e,
                        attempt,
                        max_retry_attempts = self.max_retry_attempts,
                        delay_ms = self.delay.as_millis() as u64,
                        "Attempt failed, retrying"
                    );
                    metrics::record_retry(&self.client);
                    sleep(self.delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
