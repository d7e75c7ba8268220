//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Outgoing attempt:
//!     → encryption.rs (encrypt the API key with a fresh IV)
//!     → headers.rs (Bearer credential, X-Request-ID, X-Client-Version)
//!     → transport
//! ```
//!
//! # Design Decisions
//! - The encrypted bearer token is an opaque convention shared with the
//!   data provider; it is not a signature and is not verified locally
//! - Keys are versioned so the provider can rotate them
//! - Never log the API key or the key material

pub mod encryption;
pub mod headers;

pub use encryption::{ApiKeyCipher, CipherError};
pub use headers::{bearer_token, build_request_headers};
