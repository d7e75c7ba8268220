//! Timeout enforcement.
//!
//! Every transport call runs under an absolute deadline. When it fires the
//! in-flight future is dropped, which cancels the request, and the attempt is
//! reported as a transport timeout.

use std::future::Future;
use std::time::Duration;

use crate::transport::{TransportError, TransportResponse};

/// Run a transport future with a deadline.
pub async fn with_timeout<F>(limit: Duration, fut: F) -> Result<TransportResponse, TransportError>
where
    F: Future<Output = Result<TransportResponse, TransportError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(TransportError::Timeout(limit)),
    }
}
