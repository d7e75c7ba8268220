//! OS signal handling.

use crate::lifecycle::Shutdown;

/// Wait for Ctrl-C (SIGINT) and fire `shutdown`.
pub async fn shutdown_on_ctrl_c(shutdown: &Shutdown) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Interrupt received, shutting down");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C, shutting down");
        }
    }
    shutdown.trigger();
}
