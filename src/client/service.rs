//! The resilient fetch client.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use url::Url;
use uuid::Uuid;

use crate::client::endpoint::{self, forex_key, market_key, news_key};
use crate::client::state::{run_sweeper, EndpointState, SweepReport};
use crate::client::types::{ExchangeRate, MarketData, NewsItem};
use crate::clock::{Clock, SystemClock};
use crate::config::{validate_config, ClientConfig, ConfigError, ValidationError};
use crate::error::FetchError;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::resilience::{timeouts, AttemptFailure, CircuitState, FailureOutcome, RetryPolicy};
use crate::security::{build_request_headers, ApiKeyCipher, CipherError};
use crate::transport::{HttpTransport, Transport, TransportError, TransportRequest};

/// Errors constructing a [`FetchClient`].
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Cipher(#[from] CipherError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Result of one pass through the request path.
enum Step<T> {
    Done(Result<T, FetchError>),
    Retry,
}

/// Market data client with per-endpoint caching, rate limiting, circuit
/// breaking and retries.
///
/// Must be created inside a Tokio runtime for the background sweep to run.
/// Without one, expiry is still enforced on every read.
pub struct FetchClient {
    base_url: Url,
    api_key: String,
    timeout: Duration,
    retry: RetryPolicy,
    max_requests_per_second: u32,
    cipher: ApiKeyCipher,
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    state: Arc<EndpointState>,
    shutdown: Shutdown,
}

impl FetchClient {
    /// Client on the `reqwest` transport and the system clock.
    pub fn new(config: ClientConfig) -> Result<Self, BuildError> {
        let transport = HttpTransport::new()?;
        Self::with_parts(config, Arc::new(transport), Arc::new(SystemClock))
    }

    /// Client on a caller-supplied transport and clock.
    pub fn with_parts(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, BuildError> {
        validate_config(&config).map_err(ConfigError::Validation)?;

        let base_url = Url::parse(&config.api.base_url).map_err(|e| {
            ConfigError::Validation(vec![ValidationError {
                field: "api.base_url",
                message: e.to_string(),
            }])
        })?;
        let cipher = ApiKeyCipher::from_config(&config.security)?;
        let state = Arc::new(EndpointState::new(&config.resilience));
        let shutdown = Shutdown::new();

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(run_sweeper(
                    state.clone(),
                    clock.clone(),
                    config.resilience.sweep_interval(),
                    shutdown.subscribe(),
                ));
            }
            Err(_) => {
                tracing::warn!("No Tokio runtime, background sweep disabled");
            }
        }

        tracing::info!(
            base_url = %base_url,
            timeout_ms = config.api.timeout_ms,
            max_retries = config.resilience.max_retries,
            max_requests_per_second = config.resilience.max_requests_per_second,
            cache_duration_ms = config.resilience.cache_duration_ms,
            "Fetch client initialized"
        );

        let timeout = config.api.timeout();
        Ok(Self {
            base_url,
            api_key: config.api.api_key,
            timeout,
            retry: RetryPolicy::new(
                config.resilience.max_retries,
                config.resilience.retry_delay(),
            ),
            max_requests_per_second: config.resilience.max_requests_per_second,
            cipher,
            transport,
            clock,
            state,
            shutdown,
        })
    }

    pub async fn fetch_market_data(&self, symbol: &str) -> Result<MarketData, FetchError> {
        let key = market_key(symbol)?;
        self.request(&key).await
    }

    pub async fn fetch_exchange_rates(&self, base_currency: &str) -> Result<ExchangeRate, FetchError> {
        let key = forex_key(base_currency)?;
        self.request(&key).await
    }

    pub async fn fetch_financial_news(&self, category: &str) -> Result<Vec<NewsItem>, FetchError> {
        let key = news_key(category)?;
        self.request(&key).await
    }

    /// Stop the background sweep. Safe to call any number of times; in-flight
    /// requests are not affected.
    pub fn destroy(&self) {
        if self.shutdown.trigger() {
            tracing::debug!("Fetch client destroyed");
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.shutdown.is_triggered()
    }

    /// Run one sweep now, outside the periodic schedule.
    pub fn sweep(&self) -> SweepReport {
        self.state.sweep(self.clock.now_millis())
    }

    pub fn circuit_state(&self, endpoint: &str) -> CircuitState {
        self.state.breaker.state(endpoint, self.clock.now_millis())
    }

    pub fn failure_count(&self, endpoint: &str) -> u32 {
        self.state.breaker.failure_count(endpoint)
    }

    /// Entries currently held in the cache, live or not yet swept.
    pub fn cached_entries(&self) -> usize {
        self.state.cache.len()
    }

    async fn request<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, FetchError> {
        let mut retry_count = 0;
        loop {
            match self.attempt(endpoint, retry_count).await {
                Step::Done(result) => {
                    metrics::record_request(match &result {
                        Ok(_) => "success",
                        Err(e) => e.code().as_str(),
                    });
                    return result;
                }
                Step::Retry => {
                    metrics::record_retry();
                    tokio::time::sleep(self.retry.delay()).await;
                    retry_count += 1;
                }
            }
        }
    }

    async fn attempt<T: DeserializeOwned>(&self, endpoint: &str, retry_count: u32) -> Step<T> {
        let now = self.clock.now_millis();

        if let Some(cached) = self.state.cache.get(endpoint, now) {
            tracing::debug!(endpoint, "Serving cached response");
            metrics::record_cache_hit();
            let result = T::deserialize(&cached).map_err(|e| FetchError::Api {
                endpoint: endpoint.to_string(),
                status: None,
                retry_count,
                message: format!("cached payload has unexpected shape: {}", e),
            });
            return Step::Done(result);
        }

        if self.state.breaker.is_open(endpoint, now) {
            tracing::warn!(endpoint, "Circuit breaker is open, rejecting request");
            metrics::record_circuit_rejection();
            return Step::Done(Err(FetchError::CircuitOpen {
                endpoint: endpoint.to_string(),
            }));
        }

        if !self.state.limiter.try_acquire(endpoint, now) {
            tracing::warn!(endpoint, max_requests = self.max_requests_per_second, "Rate limit exceeded");
            metrics::record_rate_limited();
            return Step::Done(Err(FetchError::RateLimit {
                endpoint: endpoint.to_string(),
                max_requests: self.max_requests_per_second,
            }));
        }

        let request_id = Uuid::new_v4().to_string();
        let request = match self.build_request(endpoint, &request_id, retry_count) {
            Ok(request) => request,
            Err(e) => return Step::Done(Err(e)),
        };

        let started = Instant::now();
        let result = timeouts::with_timeout(self.timeout, self.transport.send(request)).await;

        match result {
            Ok(response) if response.is_success() => {
                metrics::record_attempt(Some(response.status), started.elapsed());
                let decoded = response.json::<Value>().and_then(|value| {
                    let payload = T::deserialize(&value)?;
                    Ok((value, payload))
                });

                match decoded {
                    Ok((value, payload)) => {
                        self.state.cache.insert(endpoint, value, self.clock.now_millis());
                        self.state.breaker.record_success(endpoint);
                        metrics::record_cache_size(self.state.cache.len());
                        tracing::debug!(endpoint, request_id = %request_id, status = response.status, "Request succeeded");
                        Step::Done(Ok(payload))
                    }
                    Err(e) => {
                        self.record_failure(endpoint);

                        if self.retry.should_retry(AttemptFailure::Decode, retry_count) {
                            tracing::warn!(endpoint, request_id = %request_id, error = %e, retry_count, "Undecodable body, retrying");
                            return Step::Retry;
                        }

                        tracing::error!(endpoint, request_id = %request_id, error = %e, "Response body could not be decoded");
                        Step::Done(Err(FetchError::Api {
                            endpoint: endpoint.to_string(),
                            status: Some(response.status),
                            retry_count,
                            message: format!("invalid response body: {}", e),
                        }))
                    }
                }
            }
            Ok(response) => {
                metrics::record_attempt(Some(response.status), started.elapsed());
                self.record_failure(endpoint);

                if self.retry.should_retry(AttemptFailure::Status(response.status), retry_count) {
                    tracing::warn!(
                        endpoint,
                        request_id = %request_id,
                        status = response.status,
                        retry_count,
                        "Server error, retrying"
                    );
                    return Step::Retry;
                }

                tracing::error!(
                    endpoint,
                    request_id = %request_id,
                    status = response.status,
                    retry_count,
                    "API request failed"
                );
                Step::Done(Err(FetchError::Api {
                    endpoint: endpoint.to_string(),
                    status: Some(response.status),
                    retry_count,
                    message: format!("API request failed: {}", response.status_text),
                }))
            }
            Err(e) => {
                metrics::record_attempt(None, started.elapsed());
                self.record_failure(endpoint);

                if self.retry.should_retry(AttemptFailure::Transport, retry_count) {
                    tracing::warn!(endpoint, request_id = %request_id, error = %e, retry_count, "Transport error, retrying");
                    return Step::Retry;
                }

                tracing::error!(endpoint, request_id = %request_id, error = %e, retry_count, "API request failed");
                Step::Done(Err(FetchError::Api {
                    endpoint: endpoint.to_string(),
                    status: None,
                    retry_count,
                    message: e.to_string(),
                }))
            }
        }
    }

    fn build_request(
        &self,
        endpoint: &str,
        request_id: &str,
        retry_count: u32,
    ) -> Result<TransportRequest, FetchError> {
        let api_error = |message: String| FetchError::Api {
            endpoint: endpoint.to_string(),
            status: None,
            retry_count,
            message,
        };

        let url = endpoint::resolve(&self.base_url, endpoint)
            .map_err(|e| api_error(format!("invalid endpoint URL: {}", e)))?;
        let token = self
            .cipher
            .encrypt(&self.api_key)
            .map_err(|e| api_error(format!("credential encoding failed: {}", e)))?;
        let headers = build_request_headers(&token, request_id)
            .map_err(|e| api_error(format!("invalid request header: {}", e)))?;

        Ok(TransportRequest { url, headers })
    }

    fn record_failure(&self, endpoint: &str) {
        match self.state.breaker.record_failure(endpoint, self.clock.now_millis()) {
            FailureOutcome::Opened => {
                tracing::warn!(endpoint, "Circuit breaker opened");
                metrics::record_circuit_opened();
            }
            FailureOutcome::Counted(failures) => {
                tracing::debug!(endpoint, failures, "Failure recorded");
            }
            FailureOutcome::AlreadyOpen => {}
        }
    }
}

impl Drop for FetchClient {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

impl std::fmt::Debug for FetchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchClient")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .field("max_requests_per_second", &self.max_requests_per_second)
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}
