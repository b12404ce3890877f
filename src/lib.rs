//! Resilient HTTP request layer.
//!
//! A single façade ([`HttpService`]) issues requests through named clients.
//! Each client owns a policy pipeline (timeout → retry → circuit breaker)
//! wrapping a reqwest transport, and bodies are encoded/decoded as JSON, XML
//! or form data.

pub mod codec;
pub mod config;
pub mod error;
pub mod http;
pub mod observability;
pub mod resilience;

pub use codec::Format;
pub use config::HttpConfig;
pub use error::{ErrorKind, HttpError, HttpResult};
pub use http::{Auth, HttpService, SendOptions, Transport};
pub use resilience::{CircuitState, Pipeline};
