//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Client operations produce:
//!     → logging.rs (structured log events with endpoint and request id)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape), watch mode only
//! ```

pub mod logging;
pub mod metrics;
