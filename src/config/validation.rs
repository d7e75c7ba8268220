//! Configuration validation.
//!
//! Serde handles syntax; this checks value ranges and formats. Every problem
//! found is reported, not just the first.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;
use url::Url;

use crate::config::schema::ClientConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a configuration, returning all problems found.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.api.base_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError::new(
            "api.base_url",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(
            "api.base_url",
            format!("invalid URL '{}': {}", config.api.base_url, e),
        )),
    }

    if config.api.api_key.trim().is_empty() {
        errors.push(ValidationError::new("api.api_key", "must not be empty"));
    }
    if config.api.timeout_ms == 0 {
        errors.push(ValidationError::new("api.timeout_ms", "must be greater than 0"));
    }

    let resilience = &config.resilience;
    if resilience.max_requests_per_second == 0 {
        errors.push(ValidationError::new(
            "resilience.max_requests_per_second",
            "must be greater than 0",
        ));
    }
    if resilience.circuit_failure_threshold == 0 {
        errors.push(ValidationError::new(
            "resilience.circuit_failure_threshold",
            "must be greater than 0",
        ));
    }
    if resilience.sweep_interval_ms == 0 {
        errors.push(ValidationError::new(
            "resilience.sweep_interval_ms",
            "must be greater than 0",
        ));
    }
    if resilience.rate_limit_retention_ms < 1_000 {
        errors.push(ValidationError::new(
            "resilience.rate_limit_retention_ms",
            "must cover at least the 1000 ms rate-limit window",
        ));
    }

    if let Some(key) = &config.security.encryption_key {
        match STANDARD.decode(key.trim()) {
            Ok(bytes) if bytes.len() == 32 => {}
            Ok(bytes) => errors.push(ValidationError::new(
                "security.encryption_key",
                format!("expected 32 bytes, got {}", bytes.len()),
            )),
            Err(e) => errors.push(ValidationError::new(
                "security.encryption_key",
                format!("not valid base64: {}", e),
            )),
        }
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<std::net::SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("invalid socket address '{}'", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
