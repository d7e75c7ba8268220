//! Market data client.
//!
//! # Data Flow
//! ```text
//! fetch_market_data / fetch_exchange_rates / fetch_financial_news
//!     → endpoint.rs (validate argument, build endpoint key)
//!     → service.rs (cache → circuit → rate limit → transport → retry)
//!     → types.rs (typed payload)
//!
//! Background:
//!     state.rs sweep task purges stale rate-limit timestamps, cache entries
//!     and expired circuits every sweep interval until destroy()
//! ```

pub mod endpoint;
pub mod service;
pub mod state;
pub mod types;

pub use service::{BuildError, FetchClient};
pub use state::SweepReport;
pub use types::{ExchangeRate, MarketData, NewsItem};
