//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request for an endpoint key:
//!     → cache.rs (serve a live cached payload, nothing else runs)
//!     → circuit_breaker.rs (fail fast while the endpoint's circuit is open)
//!     → rate_limit.rs (admit at most N requests per trailing second)
//!     → timeouts.rs (enforce the per-attempt deadline)
//!     → On failure: circuit_breaker.rs counts it,
//!       retries.rs decides whether to go round again
//! ```
//!
//! # Design Decisions
//! - All state is keyed by endpoint and owned by one client instance
//! - Expiry is evaluated on read; the periodic sweep only reclaims memory
//! - Retries re-enter the full path, so a retry can be served from cache,
//!   rejected by an open circuit or throttled like any other call

pub mod cache;
pub mod circuit_breaker;
pub mod rate_limit;
pub mod retries;
pub mod timeouts;

pub use cache::ResponseCache;
pub use circuit_breaker::{CircuitBreakerRegistry, CircuitState, FailureOutcome};
pub use rate_limit::SlidingWindowLimiter;
pub use retries::{AttemptFailure, RetryPolicy};
