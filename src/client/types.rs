//! Response payloads of the data provider.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Latest quote for one instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketData {
    pub symbol: String,
    pub price: f64,
    pub volume: f64,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

/// Exchange rates quoted against one base currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRate {
    pub base_currency: String,
    pub rates: HashMap<String, f64>,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: String,
    /// ISO-8601 timestamp as sent by the provider.
    pub published_at: String,
}
