//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (accept loop, handler boundary)
//!     → request.rs (parse request line, headers, body, JSON payload)
//!     → [routing layer dispatches the operation]
//!     → response.rs (render status line, headers, body)
//!     → Send to client, close connection
//! ```
//!
//! The agent speaks a deliberate HTTP/1.1 subset: POST-only, no
//! keep-alive, no chunked transfer, one request per connection.

pub mod request;
pub mod response;
pub mod server;

pub use request::{parse_request, Payload, Request};
pub use response::Response;
pub use server::{Server, ServerHandle};
