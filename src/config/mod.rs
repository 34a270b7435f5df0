//! Configuration management subsystem.
//!
//! # Design Decisions
//! - No config file, CLI flags, or environment variables: the agent is
//!   embedded and configured by its host in code
//! - All fields have defaults so `AgentConfig::default()` is a working
//!   configuration (port 8080, bounded connections)
//! - Config is immutable once the server is started; a restart picks up
//!   new values

pub mod schema;

pub use schema::AgentConfig;
pub use schema::ListenerConfig;
