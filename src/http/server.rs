//! HTTP server with graceful shutdown.

use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;

/// Serves a router on one listen address.
#[derive(Debug, Clone)]
pub struct Server {
    address: String,
}

impl Server {
    /// Creates a server for `address` (`host:port`).
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }

    /// Returns the listen address.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Serves `router` until Ctrl+C or `SIGTERM`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when binding or serving fails.
    pub async fn run(self, router: Router) -> std::io::Result<()> {
        let listener = TcpListener::bind(&self.address).await?;
        tracing::info!(address = %self.address, "server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("server shutdown complete");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        () = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
