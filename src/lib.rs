//! Resilient market data client library.

pub mod client;
pub mod clock;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod security;
pub mod transport;

pub use client::{ExchangeRate, FetchClient, MarketData, NewsItem};
pub use config::schema::ClientConfig;
pub use error::{ErrorCode, FetchError};
