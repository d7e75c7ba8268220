//! Retry logic.
//!
//! # Responsibilities
//! - Determine if a failed attempt is retryable
//! - Enforce the retry budget (max retries per logical request)
//! - Provide the fixed delay between attempts
//!
//! # Design Decisions
//! - Transport errors and timeouts are always retryable
//! - 5xx responses are retryable; 4xx never are
//! - Rate-limit and open-circuit rejections are local and never retried

use std::time::Duration;

/// Why an attempt failed, as far as retrying is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptFailure {
    /// The server answered with a non-success status.
    Status(u16),
    /// No usable response (connect error, reset, timeout).
    Transport,
    /// A 2xx answer whose body could not be decoded.
    Decode,
}

/// Bounded retry with a fixed delay.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_retries: u32,
    delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn is_retryable(failure: AttemptFailure) -> bool {
        match failure {
            AttemptFailure::Status(status) => status >= 500,
            AttemptFailure::Transport => true,
            AttemptFailure::Decode => false,
        }
    }

    /// Whether attempt number `retry_count` (0-based) may be followed by another.
    pub fn should_retry(&self, failure: AttemptFailure, retry_count: u32) -> bool {
        Self::is_retryable(failure) && retry_count < self.max_retries
    }
}
