//! Policy pipeline: timeout → retry → circuit breaker → transport.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::PolicyConfig;
use crate::error::HttpResult;
use crate::http::{Request, Response, Transport};
use crate::resilience::circuit_breaker::{
    CircuitBreaker, CircuitBreakerConfig, CircuitBreakerPolicy, CircuitState,
};
use crate::resilience::retries::RetryPolicy;
use crate::resilience::timeouts::TimeoutPolicy;

type Stack = TimeoutPolicy<RetryPolicy<CircuitBreakerPolicy<Arc<dyn Transport>>>>;

/// One configured policy chain around a transport.
///
/// The circuit breaker state lives as long as the pipeline and is shared by
/// every request executed through it.
pub struct Pipeline {
    stack: Stack,
    breaker: Arc<CircuitBreaker>,
    policy: PolicyConfig,
}

impl Pipeline {
    pub fn new(client: &str, policy: PolicyConfig, transport: Arc<dyn Transport>) -> Self {
        let client: Arc<str> = Arc::from(client);
        let breaker = Arc::new(CircuitBreaker::new(
            client.clone(),
            CircuitBreakerConfig::from(&policy),
        ));

        let stack = TimeoutPolicy::new(
            client.clone(),
            policy.timeout(),
            RetryPolicy::new(
                client,
                policy.max_retry_attempts,
                policy.retry_delay(),
                CircuitBreakerPolicy::new(breaker.clone(), transport),
            ),
        );

        Self {
            stack,
            breaker,
            policy,
        }
    }

    pub fn circuit_state(&self) -> CircuitState {
        self.breaker.state()
    }

    pub fn circuit_breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("policy", &self.policy)
            .field("circuit_state", &self.circuit_state())
            .finish()
    }
}

#[async_trait]
impl Transport for Pipeline {
    async fn execute(&self, request: &Request) -> HttpResult<Response> {
        self.stack.execute(request).await
    }
}
