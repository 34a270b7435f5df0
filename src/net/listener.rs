//! TCP listener with a connection bound.
//!
//! # Responsibilities
//! - Bind to the configured address
//! - Accept incoming TCP connections
//! - Enforce the max_connections limit via semaphore
//!
//! # Design Decisions
//! - A bind failure is fatal to server start and surfaced to the caller;
//!   accept failures terminate the accept loop without tearing down
//!   in-flight handlers
//! - Each accepted connection carries a permit that is released when the
//!   handler finishes, even if it panics

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;

use crate::config::ListenerConfig;

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// Failed to bind to the configured address.
    #[error("failed to bind: {0}")]
    Bind(#[source] std::io::Error),

    /// Failed to accept a connection.
    #[error("failed to accept: {0}")]
    Accept(#[source] std::io::Error),
}

/// A bounded TCP listener.
///
/// A semaphore enforces `max_connections`; when the limit is reached new
/// connections wait in the kernel backlog until a slot frees up.
#[derive(Debug)]
pub struct Listener {
    inner: TcpListener,
    connection_limit: Arc<Semaphore>,
}

impl Listener {
    /// Bind to the configured address.
    pub async fn bind(config: &ListenerConfig) -> Result<Self, ListenerError> {
        let addr: SocketAddr = config.bind_address.parse().map_err(|e| {
            ListenerError::Bind(std::io::Error::new(std::io::ErrorKind::InvalidInput, e))
        })?;

        let listener = TcpListener::bind(addr).await.map_err(ListenerError::Bind)?;
        let local_addr = listener.local_addr().map_err(ListenerError::Bind)?;

        tracing::info!(
            address = %local_addr,
            max_connections = config.max_connections,
            "listener bound"
        );

        Ok(Self {
            inner: listener,
            connection_limit: Arc::new(Semaphore::new(config.max_connections)),
        })
    }

    /// Accept a new connection, waiting if the connection limit has been
    /// reached. The returned permit must be held for the connection's
    /// lifetime.
    pub async fn accept(&self) -> Result<(TcpStream, SocketAddr, ConnectionPermit), ListenerError> {
        // Acquire the permit first so a full handler set backpressures
        // the accept loop itself. The semaphore is never closed.
        let permit = match self.connection_limit.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => {
                return Err(ListenerError::Accept(std::io::Error::from(
                    std::io::ErrorKind::Other,
                )))
            }
        };

        let (stream, addr) = self.inner.accept().await.map_err(ListenerError::Accept)?;

        tracing::debug!(
            peer_addr = %addr,
            available_permits = self.connection_limit.available_permits(),
            "connection accepted"
        );

        Ok((stream, addr, ConnectionPermit { _permit: permit }))
    }

    /// Local address this listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.inner.local_addr()
    }
}

/// A held connection slot; dropped when the handler finishes.
#[derive(Debug)]
pub struct ConnectionPermit {
    _permit: tokio::sync::OwnedSemaphorePermit,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_for(addr: &str) -> ListenerConfig {
        ListenerConfig {
            bind_address: addr.to_string(),
            max_connections: 4,
        }
    }

    #[tokio::test]
    async fn bind_to_free_port_succeeds() {
        let listener = Listener::bind(&config_for("127.0.0.1:0")).await.unwrap();
        assert_ne!(listener.local_addr().unwrap().port(), 0);
    }

    #[tokio::test]
    async fn bind_to_taken_port_is_bind_error() {
        let first = Listener::bind(&config_for("127.0.0.1:0")).await.unwrap();
        let taken = first.local_addr().unwrap();

        let err = Listener::bind(&config_for(&taken.to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, ListenerError::Bind(_)));
    }

    #[tokio::test]
    async fn bind_to_garbage_address_is_bind_error() {
        let err = Listener::bind(&config_for("not an address")).await.unwrap_err();
        assert!(matches!(err, ListenerError::Bind(_)));
    }
}
