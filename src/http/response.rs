//! Response formatting and writing.
//!
//! # Responsibilities
//! - Render the status line, fixed header set, and plaintext body
//! - Write the rendered response to the connection, swallowing write
//!   failures from clients that disconnected mid-response
//!
//! # Design Decisions
//! - Content-Length is the encoded byte length of the body, not its
//!   character count
//! - `Access-Control-Allow-Origin: *` is always sent; the pairing UI is
//!   a browser page on the local network and cross-origin access is
//!   intentionally unrestricted
//! - The connection is being torn down after every response, so write
//!   errors are logged and dropped rather than propagated

use tokio::io::{AsyncWrite, AsyncWriteExt};

/// A plaintext response awaiting serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status_code: u16,
    pub status_text: &'static str,
    pub body: String,
}

impl Response {
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, "OK", body)
    }

    pub fn bad_request(body: impl Into<String>) -> Self {
        Self::new(400, "Bad Request", body)
    }

    pub fn unauthorized(body: impl Into<String>) -> Self {
        Self::new(401, "Unauthorized", body)
    }

    pub fn forbidden(body: impl Into<String>) -> Self {
        Self::new(403, "Forbidden", body)
    }

    pub fn not_found(body: impl Into<String>) -> Self {
        Self::new(404, "Not Found", body)
    }

    pub fn method_not_allowed(body: impl Into<String>) -> Self {
        Self::new(405, "Method Not Allowed", body)
    }

    pub fn internal_error(body: impl Into<String>) -> Self {
        Self::new(500, "Internal Server Error", body)
    }

    fn new(status_code: u16, status_text: &'static str, body: impl Into<String>) -> Self {
        Self {
            status_code,
            status_text,
            body: body.into(),
        }
    }

    /// Serialize the response to wire bytes.
    pub fn render(&self) -> Vec<u8> {
        let header = format!(
            "HTTP/1.1 {} {}\r\n\
             Content-Type: text/plain\r\n\
             Content-Length: {}\r\n\
             Access-Control-Allow-Origin: *\r\n\
             \r\n",
            self.status_code,
            self.status_text,
            self.body.len(),
        );

        let mut raw = header.into_bytes();
        raw.extend_from_slice(self.body.as_bytes());
        raw
    }

    /// Write the response to the connection. Failures are swallowed:
    /// the connection closes right after this either way.
    pub async fn write_to<W>(&self, writer: &mut W)
    where
        W: AsyncWrite + Unpin,
    {
        let raw = self.render();
        if let Err(err) = writer.write_all(&raw).await {
            tracing::debug!(error = %err, "response write failed, client gone");
            return;
        }
        if let Err(err) = writer.flush().await {
            tracing::debug!(error = %err, "response flush failed, client gone");
        }
    }
}
