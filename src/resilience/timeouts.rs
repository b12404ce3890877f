//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap the retry stage with one deadline for the whole call
//! - Cancel the in-flight attempt and any pending retry delay on expiry
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities; expiry drops the inner future
//! - Timeout errors are distinct from other errors and never retried

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;

use crate::error::{HttpError, HttpResult};
use crate::http::{Request, Response, Transport};

/// Bounds total latency of the wrapped stage.
#[derive(Debug)]
pub struct TimeoutPolicy<S> {
    inner: S,
    duration: Duration,
    client: Arc<str>,
}

impl<S> TimeoutPolicy<S> {
    pub fn new(client: Arc<str>, duration: Duration, inner: S) -> Self {
        Self {
            inner,
            duration,
            client,
        }
    }
}

#[async_trait]
impl<S: Transport> Transport for TimeoutPolicy<S> {
    async fn execute(&self, request: &Request) -> HttpResult<Response> {
        match timeout(self.duration, self.inner.execute(request)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    client = %self.client,
                    method = %request.method(),
                    url = %request.url(),
                    timeout_ms = self.duration.as_millis() as u64,
                    "Request timed out"
                );
                Err(HttpError::Timeout {
                    method: request.method().clone(),
                    url: request.url().to_string(),
                    elapsed: self.duration,
                })
            }
        }
    }
}
