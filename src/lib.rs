//! imgproxyd - same-origin image proxy daemon
//!
//! Serves uploaded images to the storefront and the dashboard from a local
//! upload directory, falling back to the API origin.

pub mod api;
pub mod config;
pub mod images;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;

pub use config::{Config, ConfigOverrides};
use images::ImageGateway;

/// The imgproxyd server instance
pub struct Server {
    config: Arc<Config>,
    gateway: Arc<ImageGateway>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl Server {
    /// Create a new server instance
    pub fn new(config: Config) -> Result<Self> {
        let gateway =
            ImageGateway::from_config(&config).context("failed to build upstream HTTP client")?;
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Ok(Self {
            config: Arc::new(config),
            gateway: Arc::new(gateway),
            shutdown_tx,
            shutdown_rx,
        })
    }

    /// Build the router
    fn router(&self) -> Router {
        api::router(self.config.clone(), self.gateway.clone())
    }

    /// Run the server until shutdown
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr)
            .await
            .with_context(|| format!("failed to bind {}", self.config.bind_addr))?;
        let local_addr = listener.local_addr()?;
        info!("imgproxyd listening on {}", local_addr);
        info!(
            "providers: {}; origin: {}",
            self.gateway.provider_names().join(" -> "),
            self.config.api_origin()
        );

        let router = self.router();
        let mut shutdown_rx = self.shutdown_rx.clone();

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown_rx.changed().await.ok();
            })
            .await?;

        info!("imgproxyd shutdown complete");
        Ok(())
    }

    /// Signal the server to shutdown
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}
