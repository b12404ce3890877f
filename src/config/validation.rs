//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeout > 0, ratio in (0, 1], window sizes)
//! - Detect duplicate client names and malformed headers
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: HttpConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use reqwest::header::{HeaderName, HeaderValue};
use thiserror::Error;

use crate::config::schema::{ClientConfig, HttpConfig};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("client name must not be empty")]
    EmptyClientName,

    #[error("duplicate client name '{0}'")]
    DuplicateClient(String),

    #[error("client '{client}': {field} {reason}")]
    InvalidValue {
        client: String,
        field: &'static str,
        reason: String,
    },

    #[error("client '{client}': invalid header '{header}'")]
    InvalidHeader { client: String, header: String },

    #[error("invalid metrics address '{0}'")]
    InvalidMetricsAddress(String),
}

/// Validate the whole configuration, collecting every violation.
pub fn validate_config(config: &HttpConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for client in &config.clients {
        if client.name.trim().is_empty() {
            errors.push(ValidationError::EmptyClientName);
        } else if !seen.insert(client.name.as_str()) {
            errors.push(ValidationError::DuplicateClient(client.name.clone()));
        }
        validate_client(client, &mut errors);
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<std::net::SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_client(client: &ClientConfig, errors: &mut Vec<ValidationError>) {
    let policy = &client.policy;
    let invalid = |field: &'static str, reason: &str| ValidationError::InvalidValue {
        client: client.name.clone(),
        field,
        reason: reason.to_string(),
    };

    if policy.timeout_secs == 0 {
        errors.push(invalid("timeout_secs", "must be greater than 0"));
    }
    if policy.circuit_min_throughput == 0 {
        errors.push(invalid("circuit_min_throughput", "must be at least 1"));
    }
    if policy.circuit_window_size == 0 {
        errors.push(invalid("circuit_window_size", "must be at least 1"));
    } else if policy.circuit_window_size < policy.circuit_min_throughput {
        errors.push(invalid(
            "circuit_window_size",
            "must be at least circuit_min_throughput",
        ));
    }
    if !(policy.circuit_failure_ratio > 0.0 && policy.circuit_failure_ratio <= 1.0) {
        errors.push(invalid("circuit_failure_ratio", "must be in (0, 1]"));
    }

    for (name, value) in client.base_headers() {
        if HeaderName::from_bytes(name.as_bytes()).is_err() || HeaderValue::from_str(&value).is_err() {
            errors.push(ValidationError::InvalidHeader {
                client: client.name.clone(),
                header: name,
            });
        }
    }
}
