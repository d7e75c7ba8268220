//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! FetchClient::new:
//!     Shutdown created → sweep task subscribes → task spawned
//!
//! FetchClient::destroy (or drop):
//!     Shutdown triggered → sweep task leaves its loop
//!
//! Binary watch mode (signals.rs):
//!     SIGINT → Shutdown triggered → poll loop exits → client destroyed
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
