//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.
//! Every field has a default so a minimal file (or none at all) works.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Name of the client registered by [`HttpConfig::default`].
pub const DEFAULT_CLIENT: &str = "resilient";

/// Root configuration for the request layer.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Named clients, each with its own pipeline.
    pub clients: Vec<ClientConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            clients: vec![ClientConfig::default()],
            observability: ObservabilityConfig::default(),
        }
    }
}

impl HttpConfig {
    /// Look up a client definition by name.
    pub fn client(&self, name: &str) -> Option<&ClientConfig> {
        self.clients.iter().find(|c| c.name == name)
    }
}

/// A named client: base headers plus one resilience policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Registry key used by callers.
    pub name: String,

    /// `User-Agent` sent with every request.
    pub user_agent: Option<String>,

    /// Additional headers sent with every request, in file order.
    /// A name may repeat.
    pub headers: Vec<HeaderConfig>,

    /// Timeout / retry / circuit breaker settings.
    pub policy: PolicyConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_CLIENT.to_string(),
            user_agent: Some(concat!("resilient-http/", env!("CARGO_PKG_VERSION")).to_string()),
            headers: Vec::new(),
            policy: PolicyConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Base headers in the order they are sent: user agent first.
    pub fn base_headers(&self) -> Vec<(String, String)> {
        let mut headers = Vec::with_capacity(self.headers.len() + 1);
        if let Some(ua) = &self.user_agent {
            headers.push(("user-agent".to_string(), ua.clone()));
        }
        headers.extend(
            self.headers
                .iter()
                .map(|h| (h.name.clone(), h.value.clone())),
        );
        headers
    }
}

/// One configured base header.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HeaderConfig {
    pub name: String,
    pub value: String,
}

impl HeaderConfig {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Resilience policy configuration for one pipeline.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct PolicyConfig {
    /// Deadline for the whole call, retries included, in seconds.
    pub timeout_secs: u64,

    /// Additional attempts after the first failure.
    pub max_retry_attempts: u32,

    /// Fixed pause between attempts in milliseconds.
    pub retry_delay_ms: u64,

    /// Samples required before the failure ratio is evaluated.
    pub circuit_min_throughput: usize,

    /// Failure ratio that opens the circuit, in (0, 1].
    pub circuit_failure_ratio: f64,

    /// How long the circuit stays open, in seconds.
    pub circuit_break_secs: u64,

    /// Capacity of the outcome window.
    pub circuit_window_size: usize,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 20,
            max_retry_attempts: 3,
            retry_delay_ms: 1000,
            circuit_min_throughput: 2,
            circuit_failure_ratio: 0.5,
            circuit_break_secs: 10,
            circuit_window_size: 100,
        }
    }
}

impl PolicyConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn circuit_break_duration(&self) -> Duration {
        Duration::from_secs(self.circuit_break_secs)
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
