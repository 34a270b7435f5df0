//! Standalone entry point for the recovery agent listener.
//!
//! Runs the command listener with in-memory collaborators: secrets live
//! in a [`MemorySecretStore`], automation requests are logged, and
//! received credentials are drained from the notification channel into
//! the log. A host integration replaces these with its own
//! implementations and embeds [`Server`] directly.
//!
//! [`MemorySecretStore`]: recovery_agent::store::MemorySecretStore
//! [`Server`]: recovery_agent::Server

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use recovery_agent::config::AgentConfig;
use recovery_agent::control::{ChannelSink, LoggingController};
use recovery_agent::store::MemorySecretStore;
use recovery_agent::Server;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "recovery_agent=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("recovery-agent v0.1.0 starting");

    let config = AgentConfig::default();
    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_connections = config.listener.max_connections,
        "configuration loaded"
    );

    let (sink, mut credentials) = ChannelSink::new();
    let server = Server::new(
        config,
        Arc::new(MemorySecretStore::new()),
        Arc::new(LoggingController),
        Arc::new(sink),
    );

    let handle = server.start().await?;

    // Drain received credentials into the log. A host integration would
    // route these to its UI instead.
    let drain = tokio::spawn(async move {
        while let Some(event) = credentials.recv().await {
            tracing::info!(
                password_type = %event.password_type,
                "credential payload delivered"
            );
        }
    });

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown signal received");

    handle.stop();
    handle.stopped().await;
    drain.abort();

    tracing::info!("shutdown complete");
    Ok(())
}
