//! Shared utilities for integration testing the command listener.
//!
//! Requests are sent over raw `TcpStream`s rather than an HTTP client so
//! tests can produce malformed wire input and assert on exact response
//! bytes (status line, headers, body).

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;

use recovery_agent::config::{AgentConfig, ListenerConfig};
use recovery_agent::control::{
    AutomationController, ChannelSink, ControlError, CredentialEvent,
};
use recovery_agent::store::MemorySecretStore;
use recovery_agent::{Server, ServerHandle};

/// Controller double that counts settings-UI invocations.
#[derive(Default)]
pub struct CountingController {
    calls: AtomicUsize,
}

impl CountingController {
    #[allow(dead_code)]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AutomationController for CountingController {
    fn open_settings_ui(&self) -> Result<(), ControlError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A running agent plus handles to all its collaborator doubles.
pub struct TestAgent {
    pub handle: ServerHandle,
    pub store: Arc<MemorySecretStore>,
    pub controller: Arc<CountingController>,
    pub credentials: mpsc::UnboundedReceiver<CredentialEvent>,
}

impl TestAgent {
    pub fn addr(&self) -> SocketAddr {
        self.handle.local_addr()
    }
}

/// Start an agent on an ephemeral port with in-memory collaborators.
pub async fn start_agent() -> TestAgent {
    start_agent_on("127.0.0.1:0").await.expect("agent must start")
}

/// Start an agent on a specific address; surfaces bind failures.
#[allow(dead_code)]
pub async fn start_agent_on(
    bind_address: &str,
) -> Result<TestAgent, recovery_agent::net::listener::ListenerError> {
    let config = AgentConfig {
        listener: ListenerConfig {
            bind_address: bind_address.to_string(),
            max_connections: 32,
        },
    };

    let store = Arc::new(MemorySecretStore::new());
    let controller = Arc::new(CountingController::default());
    let (sink, credentials) = ChannelSink::new();

    let store_dyn: Arc<dyn recovery_agent::store::SecretStore> = store.clone();
    let controller_dyn: Arc<dyn AutomationController> = controller.clone();
    let server = Server::new(config, store_dyn, controller_dyn, Arc::new(sink));
    let handle = server.start().await?;

    Ok(TestAgent {
        handle,
        store,
        controller,
        credentials,
    })
}

/// A parsed response from the agent.
#[derive(Debug)]
pub struct Reply {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl Reply {
    #[allow(dead_code)]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

/// Write raw bytes to the agent and read the full response (the agent
/// closes the connection after one exchange).
pub async fn send_raw(addr: SocketAddr, raw: &[u8]) -> Reply {
    let mut stream = TcpStream::connect(addr).await.expect("connect to agent");
    stream.write_all(raw).await.expect("write request");
    // Half-close so a lenient body read on the agent side sees EOF
    // instead of waiting for more bytes.
    stream.shutdown().await.expect("shutdown write half");

    let mut response = Vec::new();
    stream
        .read_to_end(&mut response)
        .await
        .expect("read response");
    parse_reply(&response)
}

/// POST a body to a path with a correct Content-Length.
pub async fn post(addr: SocketAddr, path: &str, body: &str) -> Reply {
    let raw = format!(
        "POST {} HTTP/1.1\r\nContent-Length: {}\r\n\r\n{}",
        path,
        body.len(),
        body
    );
    send_raw(addr, raw.as_bytes()).await
}

fn parse_reply(raw: &[u8]) -> Reply {
    let text = String::from_utf8(raw.to_vec()).expect("utf-8 response");
    let (head, body) = text
        .split_once("\r\n\r\n")
        .expect("response has a header/body separator");

    let mut lines = head.lines();
    let status_line = lines.next().expect("status line");
    let status = status_line
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .expect("numeric status code");

    let mut headers = HashMap::new();
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
        }
    }

    Reply {
        status,
        headers,
        body: body.to_string(),
    }
}
