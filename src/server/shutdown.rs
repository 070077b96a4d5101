//! Graceful shutdown signal handling

use std::io;
use thiserror::Error;
use tokio::signal;

#[derive(Debug, Error)]
enum ShutdownSignalError {
    #[error("failed to install Ctrl+C handler: {0}")]
    CtrlC(#[source] io::Error),

    #[cfg(unix)]
    #[error("failed to install SIGTERM handler: {0}")]
    SigTerm(#[source] io::Error),
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
///
/// If no handler can be installed the future never resolves and the
/// server keeps running until the process is killed.
pub async fn shutdown_signal() {
    if let Err(e) = listen().await {
        tracing::error!(error = %e, "Shutdown signal unavailable");
        std::future::pending::<()>().await;
    }
}

async fn listen() -> Result<(), ShutdownSignalError> {
    let ctrl_c = async { signal::ctrl_c().await.map_err(ShutdownSignalError::CtrlC) };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .map_err(ShutdownSignalError::SigTerm)?
            .recv()
            .await;
        Ok::<(), ShutdownSignalError>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<(), ShutdownSignalError>>();

    tokio::select! {
        result = ctrl_c => {
            result?;
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        }
        result = terminate => {
            result?;
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        }
    }

    Ok(())
}
