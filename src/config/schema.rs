//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the client.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the market data client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// Remote API location and credentials.
    pub api: ApiConfig,

    /// Rate limiting, caching, circuit breaker and retry settings.
    pub resilience: ResilienceConfig,

    /// Credential encryption settings.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl ClientConfig {
    /// Configuration with the given endpoint and credential, defaults elsewhere.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api: ApiConfig {
                base_url: base_url.into(),
                api_key: api_key.into(),
                ..ApiConfig::default()
            },
            ..Self::default()
        }
    }

    /// Copy with secrets replaced, for printing.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if !copy.api.api_key.is_empty() {
            copy.api.api_key = "<redacted>".to_string();
        }
        if copy.security.encryption_key.is_some() {
            copy.security.encryption_key = Some("<redacted>".to_string());
        }
        copy
    }
}

/// Remote API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL all endpoint paths are appended to.
    pub base_url: String,

    /// API key, sent encrypted as a bearer credential.
    pub api_key: String,

    /// Absolute per-attempt timeout in milliseconds.
    pub timeout_ms: u64,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            timeout_ms: 30_000,
        }
    }
}

/// Resilience configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ResilienceConfig {
    /// Maximum number of retries after the first attempt.
    pub max_retries: u32,

    /// Fixed delay between attempts in milliseconds.
    pub retry_delay_ms: u64,

    /// Admitted requests per endpoint in any trailing second.
    pub max_requests_per_second: u32,

    /// Recorded failures that open an endpoint's circuit.
    pub circuit_failure_threshold: u32,

    /// How long an open circuit stays open, in milliseconds.
    pub circuit_breaker_timeout_ms: u64,

    /// Lifetime of a cached response in milliseconds.
    pub cache_duration_ms: u64,

    /// Interval of the background sweep in milliseconds.
    pub sweep_interval_ms: u64,

    /// Rate-limit timestamps older than this are dropped by the sweep.
    pub rate_limit_retention_ms: u64,
}

impl ResilienceConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay_ms: 1_000,
            max_requests_per_second: 5,
            circuit_failure_threshold: 5,
            circuit_breaker_timeout_ms: 60_000,
            cache_duration_ms: 300_000,
            sweep_interval_ms: 300_000,
            rate_limit_retention_ms: 3_600_000,
        }
    }
}

/// Credential encryption configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Version byte written in front of every encrypted credential.
    pub key_version: u8,

    /// Base64 encoded 32-byte key. A random key is generated when absent.
    pub encryption_key: Option<String>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            key_version: 1,
            encryption_key: None,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.api.timeout_ms, 30_000);
        assert_eq!(config.resilience.max_retries, 3);
        assert_eq!(config.resilience.retry_delay_ms, 1_000);
        assert_eq!(config.resilience.max_requests_per_second, 5);
        assert_eq!(config.resilience.circuit_breaker_timeout_ms, 60_000);
        assert_eq!(config.resilience.cache_duration_ms, 300_000);
        assert_eq!(config.resilience.sweep_interval_ms, 300_000);
        assert_eq!(config.security.key_version, 1);
    }

    #[test]
    fn test_partial_toml() {
        let config: ClientConfig = toml::from_str(
            r#"
            [api]
            base_url = "https://data.example.com/v1"
            api_key = "k"

            [resilience]
            max_requests_per_second = 2

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.api.base_url, "https://data.example.com/v1");
        assert_eq!(config.api.timeout_ms, 30_000);
        assert_eq!(config.resilience.max_requests_per_second, 2);
        assert_eq!(config.resilience.max_retries, 3);
        assert_eq!(config.observability.log_format, LogFormat::Json);
    }

    #[test]
    fn test_redacted() {
        let mut config = ClientConfig::new("https://x.test", "secret");
        config.security.encryption_key = Some("a2V5".into());

        let shown = config.redacted();
        assert_eq!(shown.api.api_key, "<redacted>");
        assert_eq!(shown.security.encryption_key.as_deref(), Some("<redacted>"));
        assert_eq!(config.api.api_key, "secret");
    }
}
