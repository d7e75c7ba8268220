//! Per-endpoint state shared by the client and its sweep task.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{self, Instant};

use crate::clock::Clock;
use crate::config::ResilienceConfig;
use crate::observability::metrics;
use crate::resilience::{CircuitBreakerRegistry, ResponseCache, SlidingWindowLimiter};

/// What one sweep removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub rate_limit_timestamps: usize,
    pub cache_entries: usize,
    /// Expired circuits closed and idle failure counters dropped.
    pub circuits_closed: usize,
}

#[derive(Debug)]
pub(crate) struct EndpointState {
    pub(crate) limiter: SlidingWindowLimiter,
    pub(crate) cache: ResponseCache,
    pub(crate) breaker: CircuitBreakerRegistry,
    retention_ms: u64,
}

impl EndpointState {
    pub(crate) fn new(config: &ResilienceConfig) -> Self {
        Self {
            limiter: SlidingWindowLimiter::new(config.max_requests_per_second),
            cache: ResponseCache::new(config.cache_duration_ms),
            breaker: CircuitBreakerRegistry::new(
                config.circuit_failure_threshold,
                config.circuit_breaker_timeout_ms,
            ),
            retention_ms: config.rate_limit_retention_ms,
        }
    }

    pub(crate) fn sweep(&self, now: u64) -> SweepReport {
        let report = SweepReport {
            rate_limit_timestamps: self.limiter.purge(now, self.retention_ms),
            cache_entries: self.cache.purge_expired(now),
            circuits_closed: self.breaker.close_expired(now),
        };
        metrics::record_cache_size(self.cache.len());
        report
    }
}

/// Periodic sweep loop; exits when `shutdown` fires.
pub(crate) async fn run_sweeper(
    state: Arc<EndpointState>,
    clock: Arc<dyn Clock>,
    period: Duration,
    mut shutdown: broadcast::Receiver<()>,
) {
    // First tick one full period after start, not immediately.
    let mut ticker = time::interval_at(Instant::now() + period, period);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let report = state.sweep(clock.now_millis());
                tracing::debug!(
                    rate_limit_timestamps = report.rate_limit_timestamps,
                    cache_entries = report.cache_entries,
                    circuits_closed = report.circuits_closed,
                    "Sweep completed"
                );
            }
            _ = shutdown.recv() => {
                tracing::debug!("Sweep task stopping");
                break;
            }
        }
    }
}
