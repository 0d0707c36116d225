//! HTTP request parsing
//!
//! Parses the request line, headers and body from a buffered async
//! stream into an immutable `Request` value. Headers are looked up
//! case-insensitively while the original casing is preserved.

use std::collections::HashMap;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use crate::error::HttpError;

const MAX_LINE_LENGTH: usize = 8192;
const MAX_HEADER_COUNT: usize = 100;

const SUPPORTED_METHODS: [&str; 6] = ["GET", "POST", "PUT", "DELETE", "HEAD", "OPTIONS"];

/// Header collection keyed by the lower-cased name, keeping the
/// originally-cased name alongside the value.
#[derive(Debug, Default, Clone)]
pub struct HeaderMap {
    inner: HashMap<String, (String, String)>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: &str) {
        self.inner.insert(
            name.to_ascii_lowercase(),
            (name.to_string(), value.to_string()),
        );
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .get(&name.to_ascii_lowercase())
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(&name.to_ascii_lowercase())
    }

    /// Iterate over (original-case name, value) pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.values().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

/// One parsed HTTP request, immutable for the rest of its lifetime
#[derive(Debug)]
pub struct Request {
    pub method: String,
    pub path_info: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl Request {
    /// Content-Type of the request body, if any
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("Content-Type")
    }

    pub fn authorization(&self) -> Option<&str> {
        self.headers.get("Authorization")
    }
}

/// Read and parse a single request from the stream.
///
/// Bodies are only consumed for PUT and POST, delimited by the
/// Content-Length header; anything over `max_body_size` is rejected
/// before it is read.
pub async fn read_request<R>(reader: &mut R, max_body_size: usize) -> Result<Request, HttpError>
where
    R: AsyncBufRead + Unpin,
{
    let request_line = read_header_line(reader).await?;

    let mut parts = request_line.split(' ');
    let method = parts
        .next()
        .filter(|m| !m.is_empty())
        .ok_or_else(|| HttpError::MalformedRequest("empty request line".into()))?
        .to_string();
    let target = parts
        .next()
        .ok_or_else(|| HttpError::MalformedRequest("missing request target".into()))?;
    let version = parts
        .next()
        .ok_or_else(|| HttpError::MalformedRequest("missing HTTP version".into()))?;

    if !SUPPORTED_METHODS.contains(&method.as_str()) {
        return Err(HttpError::UnsupportedMethod(method));
    }
    if !version.starts_with("HTTP/") {
        return Err(HttpError::MalformedRequest("bad HTTP version".into()));
    }

    let (path_info, query) = match target.split_once('?') {
        Some((path, query)) => (path.to_string(), Some(query.to_string())),
        None => (target.to_string(), None),
    };

    let mut headers = HeaderMap::new();
    let mut header_count = 0;
    loop {
        let line = read_header_line(reader).await?;
        if line.is_empty() {
            break;
        }
        header_count += 1;
        if header_count > MAX_HEADER_COUNT {
            return Err(HttpError::MalformedRequest("too many headers".into()));
        }
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| HttpError::MalformedRequest("header without colon".into()))?;
        headers.set(name.trim(), value.trim());
    }

    let body = if method == "PUT" || method == "POST" {
        let content_length = match headers.get("Content-Length") {
            Some(v) => v
                .parse::<usize>()
                .map_err(|_| HttpError::MalformedRequest("bad Content-Length".into()))?,
            None => 0,
        };
        if content_length > max_body_size {
            return Err(HttpError::BodyTooLarge(max_body_size));
        }
        let mut body = vec![0u8; content_length];
        reader.read_exact(&mut body).await?;
        body
    } else {
        Vec::new()
    };

    Ok(Request {
        method,
        path_info,
        query,
        headers,
        body,
    })
}

/// Read one CRLF-terminated line, rejecting connections that close
/// mid-line or exceed the line length limit. The read goes through
/// `take` so the limit bounds buffering; a line that hits the limit is
/// rejected, not grown.
async fn read_header_line<R>(reader: &mut R) -> Result<String, HttpError>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    let n = reader
        .take(MAX_LINE_LENGTH as u64 + 1)
        .read_line(&mut line)
        .await?;
    if n == 0 {
        return Err(HttpError::MalformedRequest(
            "connection closed before request was complete".into(),
        ));
    }
    if !line.ends_with('\n') {
        if n > MAX_LINE_LENGTH {
            return Err(HttpError::MalformedRequest("line too long".into()));
        }
        return Err(HttpError::MalformedRequest(
            "connection closed before request was complete".into(),
        ));
    }
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    Ok(line)
}
