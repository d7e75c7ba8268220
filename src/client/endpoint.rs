//! Endpoint keys and argument validation for the public operations.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

use crate::error::FetchError;

/// Characters left literal in a path parameter, matching `encodeURIComponent`.
const PATH_PARAM: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Resource families served by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Market,
    Forex,
    News,
}

impl Resource {
    pub fn prefix(&self) -> &'static str {
        match self {
            Resource::Market => "/market",
            Resource::Forex => "/forex",
            Resource::News => "/news",
        }
    }

    /// Endpoint key for one parameter value, e.g. `/market/AAPL`.
    pub fn key(&self, param: &str) -> String {
        format!("{}/{}", self.prefix(), utf8_percent_encode(param, PATH_PARAM))
    }
}

pub fn market_key(symbol: &str) -> Result<String, FetchError> {
    if symbol.trim().is_empty() {
        return Err(FetchError::validation("Invalid symbol parameter", "symbol", symbol));
    }
    Ok(Resource::Market.key(symbol))
}

pub fn forex_key(base_currency: &str) -> Result<String, FetchError> {
    if base_currency.chars().count() != 3 {
        return Err(FetchError::validation(
            "Invalid currency code",
            "baseCurrency",
            base_currency,
        ));
    }
    Ok(Resource::Forex.key(&base_currency.to_uppercase()))
}

pub fn news_key(category: &str) -> Result<String, FetchError> {
    if category.trim().is_empty() {
        return Err(FetchError::validation("Invalid news category", "category", category));
    }
    Ok(Resource::News.key(category))
}

/// Absolute URL of an endpoint key under `base`.
///
/// The base path is kept: `https://h/api/v1` + `/market/X` gives
/// `https://h/api/v1/market/X`.
pub fn resolve(base: &Url, key: &str) -> Result<Url, url::ParseError> {
    Url::parse(&format!("{}{}", base.as_str().trim_end_matches('/'), key))
}
