//! Request parsing.
//!
//! # Responsibilities
//! - Parse the HTTP/1.1 subset the agent speaks: request line, headers,
//!   Content-Length-delimited body
//! - Decode the JSON command payload carried in the body
//!
//! # Design Decisions
//! - POST-only: any other method is a dedicated `MethodNotAllowed`
//!   rejection, distinct from a malformed request
//! - Header names are case-insensitive; the last occurrence of a
//!   repeated header wins
//! - A missing or non-numeric Content-Length means an empty body, not an
//!   error
//! - Body reads are lenient: a stream that ends early yields the short
//!   body instead of failing
//! - Malformed JSON is a distinct failure from a JSON field being absent
//!   or wrong-typed; absent fields default to the empty string

use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

/// Errors raised while parsing the wire request.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The request line was absent or empty.
    #[error("empty or missing request line")]
    MissingRequestLine,

    /// The request used a method other than POST.
    #[error("unsupported method: {0}")]
    MethodNotAllowed(String),

    /// The connection failed mid-read.
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while decoding the JSON payload from the body.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// The body was not syntactically valid JSON.
    #[error("invalid JSON: {0}")]
    Syntax(#[from] serde_json::Error),

    /// The body parsed but was not a JSON object.
    #[error("JSON body is not an object")]
    NotAnObject,
}

/// A parsed wire request.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: String,
    pub path: String,
    /// Header names lowercased; last occurrence of a repeated name wins.
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl Request {
    /// Declared body length: the Content-Length header when present and
    /// numeric, zero otherwise.
    pub fn content_length(&self) -> usize {
        self.headers
            .get("content-length")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    }
}

/// The command payload carried in every request body.
///
/// Fields are extracted individually with empty-string defaults so that
/// an absent or wrong-typed field never fails the request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Payload {
    pub secret_key: String,
    pub password_type: String,
    pub password: String,
    pub action: String,
}

impl Payload {
    /// Decode a payload from raw body bytes.
    pub fn from_body(body: &[u8]) -> Result<Self, PayloadError> {
        let value: Value = serde_json::from_slice(body)?;
        if !value.is_object() {
            return Err(PayloadError::NotAnObject);
        }
        Ok(Self {
            secret_key: string_field(&value, "secretKey"),
            password_type: string_field(&value, "passwordType"),
            password: string_field(&value, "password"),
            action: string_field(&value, "action"),
        })
    }
}

fn string_field(value: &Value, name: &str) -> String {
    value
        .get(name)
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string()
}

/// Parse one request from the connection's read half.
///
/// Reads the request line, headers up to the blank separator line, and
/// up to Content-Length body bytes. The body read stops at end of stream
/// without erroring, so `body.len()` equals the declared length only
/// when the client sent it all.
pub async fn parse_request<R>(reader: &mut R) -> Result<Request, ParseError>
where
    R: AsyncBufRead + Unpin,
{
    let request_line = read_trimmed_line(reader).await?;
    let request_line = match request_line {
        Some(line) if !line.trim().is_empty() => line,
        _ => return Err(ParseError::MissingRequestLine),
    };

    // Split on the first whitespace run; the HTTP version token, if any,
    // is discarded.
    let mut tokens = request_line.split_whitespace();
    let method = tokens.next().unwrap_or("").to_string();
    let path = tokens.next().unwrap_or("").to_string();

    if method != "POST" {
        return Err(ParseError::MethodNotAllowed(method));
    }

    let mut headers = HashMap::new();
    loop {
        match read_trimmed_line(reader).await? {
            None => break, // client closed before the blank line
            Some(line) if line.is_empty() => break,
            Some(line) => {
                if let Some((name, value)) = line.split_once(':') {
                    headers.insert(
                        name.trim().to_ascii_lowercase(),
                        value.trim().to_string(),
                    );
                }
                // header lines without a colon are ignored
            }
        }
    }

    let mut request = Request {
        method,
        path,
        headers,
        body: Vec::new(),
    };

    let declared = request.content_length();
    if declared > 0 {
        let mut body = Vec::new();
        reader.take(declared as u64).read_to_end(&mut body).await?;
        request.body = body;
    }

    Ok(request)
}

/// Read one line, stripped of its trailing CRLF/LF. `None` at end of
/// stream.
async fn read_trimmed_line<R>(reader: &mut R) -> Result<Option<String>, ParseError>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    let read = reader.read_line(&mut line).await?;
    if read == 0 {
        return Ok(None);
    }
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    Ok(Some(line))
}
