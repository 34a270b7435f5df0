//! Server wiring and the per-connection handler boundary.
//!
//! # Responsibilities
//! - Own the bound listener and the long-lived accept loop
//! - Spawn one handler task per accepted connection
//! - Contain every per-connection failure: nothing propagates past a
//!   handler, the listener itself only fails fatally on bind
//!
//! # Data Flow
//! ```text
//! accept → handler task → parse request → decode JSON payload
//!        → route dispatch → write response → close connection
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::BufReader;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;

use crate::config::AgentConfig;
use crate::control::{AutomationController, NotificationSink};
use crate::http::request::{parse_request, ParseError, Payload};
use crate::http::response::Response;
use crate::lifecycle::Shutdown;
use crate::net::connection::{ConnectionGuard, ConnectionTracker};
use crate::net::listener::{Listener, ListenerError};
use crate::routing::Router;
use crate::store::SecretStore;

/// The embedded command listener.
///
/// Holds the collaborators and configuration; each [`start`] binds a
/// fresh socket, so stop-then-start restarts cleanly.
///
/// [`start`]: Server::start
pub struct Server {
    config: AgentConfig,
    store: Arc<dyn SecretStore>,
    controller: Arc<dyn AutomationController>,
    sink: Arc<dyn NotificationSink>,
}

impl Server {
    pub fn new(
        config: AgentConfig,
        store: Arc<dyn SecretStore>,
        controller: Arc<dyn AutomationController>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            config,
            store,
            controller,
            sink,
        }
    }

    /// Bind the listener and spawn the accept loop.
    ///
    /// Fails with [`ListenerError::Bind`] if the port is unavailable.
    pub async fn start(&self) -> Result<ServerHandle, ListenerError> {
        let listener = Listener::bind(&self.config.listener).await?;
        let local_addr = listener.local_addr().map_err(ListenerError::Bind)?;

        let router = Arc::new(Router::new(
            Arc::clone(&self.store),
            Arc::clone(&self.controller),
            Arc::clone(&self.sink),
        ));
        let tracker = ConnectionTracker::new();
        let shutdown = Shutdown::new();
        let shutdown_rx = shutdown.subscribe();

        let task = tokio::spawn(accept_loop(
            listener,
            router,
            tracker.clone(),
            shutdown_rx,
        ));

        tracing::info!(address = %local_addr, "command listener started");

        Ok(ServerHandle {
            local_addr,
            shutdown,
            tracker,
            task,
        })
    }
}

/// Handle to a running server.
pub struct ServerHandle {
    local_addr: SocketAddr,
    shutdown: Shutdown,
    tracker: ConnectionTracker,
    task: JoinHandle<()>,
}

impl ServerHandle {
    /// Address the listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting connections. In-flight handlers finish on their
    /// own; the bound socket closes when the accept loop exits.
    pub fn stop(&self) {
        self.shutdown.trigger();
    }

    /// Number of in-flight connection handlers.
    pub fn active_connections(&self) -> u64 {
        self.tracker.active_count()
    }

    /// Wait for the accept loop to exit. Call after [`stop`] when the
    /// socket must be released before a re-bind.
    ///
    /// [`stop`]: ServerHandle::stop
    pub async fn stopped(self) {
        let _ = self.task.await;
    }
}

async fn accept_loop(
    listener: Listener,
    router: Arc<Router>,
    tracker: ConnectionTracker,
    mut shutdown_rx: tokio::sync::broadcast::Receiver<()>,
) {
    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                tracing::info!("stop requested, listener shutting down");
                break;
            }
            accepted = listener.accept() => {
                let (stream, peer, permit) = match accepted {
                    Ok(accepted) => accepted,
                    Err(err) => {
                        tracing::error!(error = %err, "accept failed, listener shutting down");
                        break;
                    }
                };

                let router = Arc::clone(&router);
                let guard = tracker.track();
                tokio::spawn(async move {
                    handle_connection(stream, peer, router, guard).await;
                    drop(permit);
                });
            }
        }
    }
    // The listener (and with it the bound socket) drops here, exactly
    // once, whether the loop exited on stop or on an accept error.
}

/// Handle one connection end to end.
///
/// Every failure is converted into a response here and the connection
/// closed on return; nothing propagates to the accept loop.
async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    router: Arc<Router>,
    guard: ConnectionGuard,
) {
    let conn = guard.id();
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    let response = match respond(&mut reader, peer, &router).await {
        Ok(response) => response,
        Err(err) => {
            tracing::error!(connection_id = %conn, peer = %peer, error = %err, "request handling failed");
            Response::internal_error(format!("Server error: {err}"))
        }
    };

    if response.status_code >= 400 {
        tracing::warn!(
            connection_id = %conn,
            peer = %peer,
            status = response.status_code,
            "request rejected"
        );
    }

    response.write_to(&mut write_half).await;
    // Both halves drop on return, closing the connection.
}

/// Parse, decode, and dispatch one request.
async fn respond(
    reader: &mut BufReader<tokio::net::tcp::OwnedReadHalf>,
    peer: SocketAddr,
    router: &Router,
) -> Result<Response, std::io::Error> {
    let request = match parse_request(reader).await {
        Ok(request) => request,
        Err(ParseError::MethodNotAllowed(method)) => {
            tracing::warn!(peer = %peer, method = %method, "non-POST request rejected");
            return Ok(Response::method_not_allowed(
                "Only POST requests are supported.",
            ));
        }
        Err(ParseError::MissingRequestLine) => {
            tracing::warn!(peer = %peer, "malformed request line");
            return Ok(Response::bad_request("Malformed request line."));
        }
        Err(ParseError::Io(err)) => return Err(err),
    };

    // The body is decoded before routing, so an unknown path with a
    // malformed body still reports the malformed body.
    let payload = match Payload::from_body(&request.body) {
        Ok(payload) => payload,
        Err(err) => {
            tracing::warn!(peer = %peer, path = %request.path, error = %err, "invalid JSON body");
            return Ok(Response::bad_request("Invalid JSON format."));
        }
    };

    tracing::debug!(peer = %peer, path = %request.path, "dispatching request");
    Ok(router.dispatch(&request.path, &payload))
}
