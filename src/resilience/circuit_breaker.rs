//! Circuit breaker for backend protection.
//!
//! # States
//! - Closed: normal operation, requests pass through
//! - Open: backend assumed down, requests fail fast
//! - Half-Open: one trial request probes recovery
//!
//! # State Transitions
//! ```text
//! Closed → Open: window holds >= min_throughput samples and failure ratio >= threshold
//! Open → Half-Open: first request after break_duration (lazy, no timer)
//! Half-Open → Closed: trial succeeds (window reset)
//! Half-Open → Open: trial fails or is cancelled (break restarts)
//! ```
//!
//! # Design Decisions
//! - One breaker per pipeline, shared by every request through it
//! - Recording, evaluation and transition happen under one mutex
//! - Requests arriving while the trial is in flight fail fast
//! - Outcomes from calls admitted before the last transition are ignored

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::config::PolicyConfig;
use crate::error::{HttpError, HttpResult};
use crate::http::{Request, Response, Transport};
use crate::observability::metrics;

/// Observable circuit state.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed = 0,
    Open = 1,
    HalfOpen = 2,
}

/// Breaker thresholds.
#[derive(Debug, Clone, PartialEq)]
pub struct CircuitBreakerConfig {
    pub min_throughput: usize,
    pub failure_ratio: f64,
    pub break_duration: Duration,
    pub window_size: usize,
}

impl From<&PolicyConfig> for CircuitBreakerConfig {
    fn from(policy: &PolicyConfig) -> Self {
        let min_throughput = policy.circuit_min_throughput.max(1);
        // The window must be able to reach min_throughput or the circuit never opens.
        Self {
            min_throughput,
            failure_ratio: policy.circuit_failure_ratio,
            break_duration: policy.circuit_break_duration(),
            window_size: policy.circuit_window_size.max(min_throughput),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Closed,
    Open { opened_at: Instant },
    HalfOpen,
}

#[derive(Debug)]
struct Circuit {
    phase: Phase,
    /// Most recent outcomes, `true` for failure.
    window: VecDeque<bool>,
    failures: usize,
    /// Bumped on every transition; permits from an older epoch are stale.
    epoch: u64,
}

/// Ticket handed out by [`CircuitBreaker::try_acquire`].
#[derive(Debug)]
pub struct Permit<'a> {
    breaker: &'a CircuitBreaker,
    epoch: u64,
    trial: bool,
    done: bool,
}

impl Permit<'_> {
    /// Record the outcome of the admitted call.
    pub fn complete(mut self, success: bool) {
        self.done = true;
        self.breaker.record(self.epoch, self.trial, success);
    }
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        // A trial dropped mid-flight (e.g. by the timeout policy) reopens the circuit.
        if !self.done && self.trial {
            self.breaker.record(self.epoch, true, false);
        }
    }
}

/// Failure-ratio circuit breaker state machine.
#[derive(Debug)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    circuit: Mutex<Circuit>,
    client: Arc<str>,
}

impl CircuitBreaker {
    pub fn new(client: Arc<str>, config: CircuitBreakerConfig) -> Self {
        metrics::record_circuit_state(&client, CircuitState::Closed as u8);
        Self {
            circuit: Mutex::new(Circuit {
                phase: Phase::Closed,
                window: VecDeque::with_capacity(config.window_size),
                failures: 0,
                epoch: 0,
            }),
            config,
            client,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Circuit> {
        self.circuit.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current state. An Open circuit whose break has elapsed still reports
    /// Open until the next request moves it to Half-Open.
    pub fn state(&self) -> CircuitState {
        match self.lock().phase {
            Phase::Closed => CircuitState::Closed,
            Phase::Open { .. } => CircuitState::Open,
            Phase::HalfOpen => CircuitState::HalfOpen,
        }
    }

    /// Number of outcomes currently in the window.
    pub fn samples(&self) -> usize {
        self.lock().window.len()
    }

    /// Admit a call, or return how long until the circuit may admit one.
    pub fn try_acquire(&self) -> Result<Permit<'_>, Duration> {
        let mut circuit = self.lock();
        let phase = circuit.phase;
        match phase {
            Phase::Closed => Ok(Permit {
                breaker: self,
                epoch: circuit.epoch,
                trial: false,
                done: false,
            }),
            Phase::Open { opened_at } => {
                let elapsed = opened_at.elapsed();
                if elapsed < self.config.break_duration {
                    return Err(self.config.break_duration - elapsed);
                }
                self.transition(&mut circuit, Phase::HalfOpen);
                Ok(Permit {
                    breaker: self,
                    epoch: circuit.epoch,
                    trial: true,
                    done: false,
                })
            }
            Phase::HalfOpen => Err(Duration::ZERO),
        }
    }

    fn record(&self, epoch: u64, trial: bool, success: bool) {
        let mut circuit = self.lock();
        if circuit.epoch != epoch {
            return;
        }

        let phase = circuit.phase;
        match phase {
            Phase::HalfOpen if trial => {
                if success {
                    circuit.window.clear();
                    circuit.failures = 0;
                    self.transition(&mut circuit, Phase::Closed);
                } else {
                    let now = Instant::now();
                    self.transition(&mut circuit, Phase::Open { opened_at: now });
                }
            }
            Phase::Closed => {
                if circuit.window.len() == self.config.window_size {
                    if let Some(true) = circuit.window.pop_front() {
                        circuit.failures -= 1;
                    }
                }
                circuit.window.push_back(!success);
                if !success {
                    circuit.failures += 1;
                }

                let samples = circuit.window.len();
                if samples >= self.config.min_throughput {
                    let ratio = circuit.failures as f64 / samples as f64;
                    if ratio >= self.config.failure_ratio {
                        tracing::warn!(
                            client = %self.client,
                            failures = circuit.failures,
                            samples,
                            ratio,
                            "Failure ratio reached, opening circuit"
                        );
                        let now = Instant::now();
                        self.transition(&mut circuit, Phase::Open { opened_at: now });
                    }
                }
            }
            _ => {}
        }
    }

    fn transition(&self, circuit: &mut Circuit, to: Phase) {
        circuit.phase = to;
        circuit.epoch += 1;
        let state = match to {
            Phase::Closed => CircuitState::Closed,
            Phase::Open { .. } => CircuitState::Open,
            Phase::HalfOpen => CircuitState::HalfOpen,
        };
        tracing::info!(client = %self.client, state = ?state, "Circuit state changed");
        metrics::record_circuit_state(&self.client, state as u8);
    }
}

/// Transport stage guarded by a [`CircuitBreaker`].
///
/// Non-2xx responses are turned into `HttpStatus` errors here, so they count
/// as failures for both the breaker and the retry policy above it.
#[derive(Debug)]
pub struct CircuitBreakerPolicy<S> {
    inner: S,
    breaker: Arc<CircuitBreaker>,
}

impl<S> CircuitBreakerPolicy<S> {
    pub fn new(breaker: Arc<CircuitBreaker>, inner: S) -> Self {
        Self { inner, breaker }
    }
}

#[async_trait]
impl<S: Transport> Transport for CircuitBreakerPolicy<S> {
    async fn execute(&self, request: &Request) -> HttpResult<Response> {
        let permit = match self.breaker.try_acquire() {
            Ok(permit) => permit,
            Err(retry_after) => {
                tracing::debug!(
                    client = %self.breaker.client,
                    method = %request.method(),
                    url = %request.url(),
                    "Circuit open, rejecting request"
                );
                metrics::record_circuit_rejection(&self.breaker.client);
                return Err(HttpError::CircuitOpen {
                    method: request.method().clone(),
                    url: request.url().to_string(),
                    retry_after,
                });
            }
        };

        let result = self
            .inner
            .execute(request)
            .await
            .and_then(|response| response.error_for_status(request));
        permit.complete(result.is_ok());
        result
    }
}
