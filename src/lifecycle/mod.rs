//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:  bind listener → spawn accept loop → hand back ServerHandle
//! Shutdown: stop() → broadcast signal → accept loop exits, socket
//!           closed once → in-flight handlers finish independently
//! ```
//!
//! # Design Decisions
//! - Shutdown is a broadcast, not a cancellation: handlers run to
//!   completion or to their own read/write failure
//! - stop() then start() re-binds cleanly

pub mod shutdown;

pub use shutdown::Shutdown;
