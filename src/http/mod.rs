//! HTTP request layer.
//!
//! # Data Flow
//! ```text
//! caller
//!     → client.rs (HttpService: resolve client, build request, encode body)
//!     → request.rs (immutable Request: headers, auth, body)
//!     → resilience::Pipeline (timeout → retry → circuit breaker)
//!     → transport.rs (reqwest exchange)
//!     → response.rs (buffered Response)
//!     → client.rs (decode or propagate error)
//! ```

pub mod client;
pub mod request;
pub mod response;
pub mod transport;

pub use client::{ClientRegistry, HttpService, NamedClient, SendOptions};
pub use request::{Auth, Body, Request, RequestBuilder, X_REQUEST_ID};
pub use response::Response;
pub use transport::{ReqwestTransport, Transport};
