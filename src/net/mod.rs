//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept loop, connection limit)
//!     → connection.rs (identity, lifetime tracking)
//!     → Hand off to the HTTP layer
//! ```
//!
//! # Design Decisions
//! - Bounded accept queue prevents resource exhaustion
//! - One handler task per connection; a stalled client pins only its own
//!   handler
//! - Stopping the listener never cancels in-flight handlers

pub mod connection;
pub mod listener;
