//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Parsed request (path, payload)
//!     → router.rs (exact-match path dispatch)
//!     → auth check for protected routes
//!     → operation (store secret / forward credentials / run command)
//!     → Response
//! ```
//!
//! # Design Decisions
//! - Exact path match only; anything unrecognized is 404
//! - Authorization failures short-circuit before route behavior
//! - Collaborator failures become 500 with the error message in the body

pub mod router;

pub use router::Router;
