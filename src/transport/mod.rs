//! Transport subsystem.
//!
//! The client never talks HTTP directly; it hands a [`TransportRequest`] to a
//! [`Transport`] and gets back status, reason phrase and raw body. The default
//! implementation is [`HttpTransport`] on `reqwest`; tests plug in scripted
//! transports.

pub mod http;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub use http::HttpTransport;

/// A GET request to send.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub url: Url,
    pub headers: HeaderMap,
}

/// What came back from the remote side.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub status_text: String,
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Response with the canonical reason phrase for `status`.
    pub fn new(status: u16, body: Vec<u8>) -> Self {
        let status_text = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("")
            .to_string();
        Self {
            status,
            status_text,
            body,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Failures below the HTTP status level.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("transport error: {0}")]
    Other(String),

    #[error("failed to build HTTP client: {0}")]
    Build(String),
}

/// A fetch-like primitive.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}
