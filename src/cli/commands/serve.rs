//! Serve command implementation
//!
//! Connects to the configured store, then serves the HTTP API until a
//! shutdown signal arrives.

use crate::adapters::database::create_document_store;
use crate::config::DocflowConfig;
use crate::core::lifecycle::LifecycleService;
use crate::http::{create_router, AppState};
use anyhow::Context;
use clap::Args;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;

/// Arguments for the serve command
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Override the configured listen port
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl ServeArgs {
    /// Execute the serve command
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable at startup or the
    /// listener cannot be bound. Nothing is served in either case.
    pub async fn execute(
        &self,
        mut config: DocflowConfig,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        if let Some(port) = self.port {
            config.server.port = port;
        }

        let store = create_document_store(&config.store)
            .await
            .context("Failed to connect to the document store")?;
        let service = LifecycleService::from_config(store, &config.store);
        let backend = service.gateway().backend_name();

        let address = config.server.bind_address();
        let listener = TcpListener::bind(&address)
            .await
            .with_context(|| format!("Failed to bind {address}"))?;
        let port = listener.local_addr()?.port();

        let app = create_router(AppState::new(service, port));

        tracing::info!(
            address = %address,
            port = port,
            backend = backend,
            document_collection = %config.store.document_collection,
            batch_collection = %config.store.batch_collection,
            "Server listening"
        );

        let server = axum::serve(listener, app)
            .with_graceful_shutdown(wait_for_shutdown(shutdown_signal.clone()));
        let mut handle = tokio::spawn(async move { server.await });

        tokio::select! {
            joined = &mut handle => {
                joined.context("Server task failed")??;
                return Ok(0);
            }
            _ = wait_for_shutdown(shutdown_signal) => {}
        }

        let grace = Duration::from_secs(config.server.shutdown_timeout_secs);
        match tokio::time::timeout(grace, &mut handle).await {
            Ok(joined) => {
                joined.context("Server task failed")??;
                tracing::info!("Server stopped");
            }
            Err(_) => {
                tracing::warn!(
                    grace_secs = grace.as_secs(),
                    "In-flight requests did not finish in time, aborting"
                );
                handle.abort();
            }
        }
        Ok(0)
    }
}

/// Resolves once the shutdown flag is raised or its sender is gone
async fn wait_for_shutdown(mut signal: watch::Receiver<bool>) {
    let _ = signal.wait_for(|stop| *stop).await;
}
