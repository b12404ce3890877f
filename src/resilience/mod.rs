//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request from the façade:
//!     → timeouts.rs (one deadline for the whole call)
//!     → retries.rs (fixed-delay retry of transient failures)
//!     → circuit_breaker.rs (fail fast when the failure ratio is too high)
//!     → transport
//! ```
//!
//! # Design Decisions
//! - Every policy is a `Transport` wrapping another `Transport`
//! - Timeout is outermost, so it bounds retries and delays together
//! - Circuit breaker state is owned by the pipeline, never global

pub mod circuit_breaker;
pub mod pipeline;
pub mod retries;
pub mod timeouts;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerPolicy, CircuitState};
pub use pipeline::Pipeline;
pub use retries::RetryPolicy;
pub use timeouts::TimeoutPolicy;
