//! Embedded command listener for remote device recovery.
//!
//! A single-process HTTP/1.1-subset listener that receives commands and
//! credential payloads over a local network, authenticates them against
//! a locally stored shared secret, and dispatches to a fixed set of
//! operations. UI automation and credential consumption are host
//! concerns reached through the narrow traits in [`control`]; secret
//! persistence is behind [`store::SecretStore`].

// Core subsystems
pub mod config;
pub mod http;
pub mod net;
pub mod routing;

// Operations
pub mod auth;
pub mod control;
pub mod store;

// Cross-cutting concerns
pub mod lifecycle;

pub use config::AgentConfig;
pub use http::server::{Server, ServerHandle};
pub use lifecycle::Shutdown;
