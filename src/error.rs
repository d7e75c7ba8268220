//! Caller-facing error taxonomy.

use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

/// Stable discriminator carried by every [`FetchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    RateLimit,
    CircuitOpen,
    ApiError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::RateLimit => "RATE_LIMIT",
            ErrorCode::CircuitOpen => "CIRCUIT_OPEN",
            ErrorCode::ApiError => "API_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced by the public fetch operations.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// Bad caller input. Never retried.
    #[error("{message}")]
    Validation {
        message: String,
        field: &'static str,
        value: String,
    },

    /// Local throttling. The caller has to back off.
    #[error("Rate limit exceeded for {endpoint} (max {max_requests} requests/sec)")]
    RateLimit { endpoint: String, max_requests: u32 },

    /// The endpoint's circuit is open; no request was sent.
    #[error("Circuit breaker is open for {endpoint}")]
    CircuitOpen { endpoint: String },

    /// Remote or transport failure.
    #[error("API request to {endpoint} failed: {message}")]
    Api {
        endpoint: String,
        status: Option<u16>,
        retry_count: u32,
        message: String,
    },
}

impl FetchError {
    pub(crate) fn validation(message: &str, field: &'static str, value: &str) -> Self {
        FetchError::Validation {
            message: message.to_string(),
            field,
            value: value.to_string(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            FetchError::Validation { .. } => ErrorCode::ValidationError,
            FetchError::RateLimit { .. } => ErrorCode::RateLimit,
            FetchError::CircuitOpen { .. } => ErrorCode::CircuitOpen,
            FetchError::Api { .. } => ErrorCode::ApiError,
        }
    }

    /// Structured context for logs and API responses.
    pub fn details(&self) -> Value {
        match self {
            FetchError::Validation { field, value, .. } => {
                let mut map = serde_json::Map::new();
                map.insert(field.to_string(), Value::String(value.clone()));
                Value::Object(map)
            }
            FetchError::RateLimit {
                endpoint,
                max_requests,
            } => json!({ "endpoint": endpoint, "maxRequests": max_requests }),
            FetchError::CircuitOpen { endpoint } => json!({ "endpoint": endpoint }),
            FetchError::Api {
                endpoint,
                status,
                retry_count,
                ..
            } => json!({ "endpoint": endpoint, "status": status, "retryCount": retry_count }),
        }
    }
}
