//! HTTP response building and serialization
//!
//! Every response defaults to a JSON content type and a permissive
//! CORS origin, matching what remoteStorage clients running in a
//! browser expect.

use serde_json::json;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::RequestError;

/// One outgoing HTTP response
#[derive(Debug)]
pub struct Response {
    pub status: u16,
    headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Default for Response {
    fn default() -> Self {
        Self {
            status: 200,
            headers: vec![
                ("Content-Type".to_string(), "application/json".to_string()),
                ("Access-Control-Allow-Origin".to_string(), "*".to_string()),
            ],
            body: Vec::new(),
        }
    }
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a header, replacing any existing value for the same
    /// case-insensitive name
    pub fn set_header(&mut self, name: &str, value: &str) {
        self.headers
            .retain(|(n, _)| !n.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value.to_string()));
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn set_body(&mut self, body: Vec<u8>) {
        self.body = body;
    }

    /// Build the error response for a failed request: JSON body with
    /// the OAuth error code plus the challenge header where one applies
    pub fn from_error(error: &RequestError) -> Self {
        let mut response = Response::new();
        response.status = error.http_status();
        if let Some(challenge) = error.challenge() {
            response.set_header("WWW-Authenticate", &challenge);
        }
        let body = json!({
            "error": error.code(),
            "error_description": error.description(),
        });
        response.set_body(body.to_string().into_bytes());
        response
    }

    /// Serialize the response onto the stream and flush it. The
    /// connection is closed by the caller afterwards.
    pub async fn write_to<W>(&self, writer: &mut W) -> std::io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        let mut head = format!(
            "HTTP/1.1 {} {}\r\n",
            self.status,
            reason_phrase(self.status)
        );
        for (name, value) in &self.headers {
            head.push_str(&format!("{}: {}\r\n", name, value));
        }
        head.push_str(&format!("Content-Length: {}\r\n", self.body.len()));
        head.push_str("Connection: close\r\n\r\n");

        writer.write_all(head.as_bytes()).await?;
        writer.write_all(&self.body).await?;
        writer.flush().await
    }
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "",
    }
}
