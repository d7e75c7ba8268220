//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::ClientConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Overrides `api.base_url`.
pub const ENV_BASE_URL: &str = "MARKET_API_BASE_URL";
/// Overrides `api.api_key`.
pub const ENV_API_KEY: &str = "MARKET_API_KEY";
/// Overrides `security.encryption_key`.
pub const ENV_ENCRYPTION_KEY: &str = "ENCRYPTION_KEY_V1";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load a TOML file, apply environment overrides and validate.
pub fn load_config(path: &Path) -> Result<ClientConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let mut config: ClientConfig = toml::from_str(&content)?;

    apply_env_overrides(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    tracing::debug!(path = %path.display(), "Configuration loaded");
    Ok(config)
}

/// Build a configuration from defaults and the environment alone.
pub fn load_from_env() -> Result<ClientConfig, ConfigError> {
    let mut config = ClientConfig::default();
    apply_env_overrides(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply overrides from the process environment.
pub fn apply_env_overrides(config: &mut ClientConfig) {
    apply_overrides_with(config, |name| std::env::var(name).ok());
}

/// Apply overrides using an arbitrary variable lookup.
pub fn apply_overrides_with<F>(config: &mut ClientConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(url) = non_empty(ENV_BASE_URL) {
        config.api.base_url = url;
    }
    if let Some(key) = non_empty(ENV_API_KEY) {
        config.api.api_key = key;
    }
    if let Some(key) = non_empty(ENV_ENCRYPTION_KEY) {
        config.security.encryption_key = Some(key);
    }
}
