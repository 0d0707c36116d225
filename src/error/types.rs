//! Error types
//!
//! Domain-specific error types for each module of the server, plus the
//! top-level `RequestError` that carries every failure to the HTTP
//! boundary as an OAuth-style `(code, status, description)` triple.

use std::fmt;
use std::io;

use crate::oauth::scope::Permission;

/// Token verification and scope errors
#[derive(Debug)]
pub enum VerifyError {
    /// Token malformed, unverifiable or rejected by the endpoint
    InvalidToken(String),
    /// Token valid but the granted scope lacks the required permission
    InsufficientScope {
        category: Option<String>,
        permission: Permission,
        granted: String,
    },
}

impl VerifyError {
    pub fn code(&self) -> &'static str {
        match self {
            VerifyError::InvalidToken(_) => "invalid_token",
            VerifyError::InsufficientScope { .. } => "insufficient_scope",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            VerifyError::InvalidToken(_) => 401,
            VerifyError::InsufficientScope { .. } => 403,
        }
    }

    pub fn description(&self) -> String {
        match self {
            VerifyError::InvalidToken(d) => d.clone(),
            VerifyError::InsufficientScope {
                category,
                permission,
                granted,
            } => format!(
                "no {} grant for category '{}' in scope '{}'",
                permission,
                category.as_deref().unwrap_or(""),
                granted
            ),
        }
    }

    /// Value for the WWW-Authenticate challenge header
    pub fn challenge(&self) -> String {
        format!(
            "Bearer realm=\"Resource Server\",error=\"{}\",error_description=\"{}\"",
            self.code(),
            self.description()
        )
    }
}

impl fmt::Display for VerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}

impl std::error::Error for VerifyError {}

/// Storage module errors
#[derive(Debug)]
pub enum StorageError {
    NotFound(String),
    InvalidRequest(String),
    IoError(io::Error),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::NotFound(d) => write!(f, "not found: {}", d),
            StorageError::InvalidRequest(d) => write!(f, "invalid request: {}", d),
            StorageError::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<io::Error> for StorageError {
    fn from(error: io::Error) -> Self {
        StorageError::IoError(error)
    }
}

/// HTTP parsing errors, reported before dispatch
#[derive(Debug)]
pub enum HttpError {
    MalformedRequest(String),
    UnsupportedMethod(String),
    BodyTooLarge(usize),
    IoError(io::Error),
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpError::MalformedRequest(d) => write!(f, "malformed request: {}", d),
            HttpError::UnsupportedMethod(m) => write!(f, "unsupported method: {}", m),
            HttpError::BodyTooLarge(n) => write!(f, "request body exceeds {} bytes", n),
            HttpError::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for HttpError {}

impl From<io::Error> for HttpError {
    fn from(error: io::Error) -> Self {
        HttpError::IoError(error)
    }
}

/// Any failure a request can end in, carried to the response boundary
#[derive(Debug)]
pub enum RequestError {
    Verify(VerifyError),
    Storage(StorageError),
    /// Owner path segment does not match the token's resource owner
    AccessDenied(String),
    /// No token where one is required
    NotAuthorized,
    Internal(String),
}

impl RequestError {
    pub fn code(&self) -> &'static str {
        match self {
            RequestError::Verify(e) => e.code(),
            RequestError::Storage(StorageError::NotFound(_)) => "not_found",
            RequestError::Storage(StorageError::InvalidRequest(_)) => "invalid_request",
            RequestError::Storage(StorageError::IoError(_)) => "internal_server_error",
            RequestError::AccessDenied(_) => "access_denied",
            RequestError::NotAuthorized => "not_authorized",
            RequestError::Internal(_) => "internal_server_error",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            RequestError::Verify(e) => e.http_status(),
            RequestError::Storage(StorageError::NotFound(_)) => 404,
            RequestError::Storage(StorageError::InvalidRequest(_)) => 400,
            RequestError::Storage(StorageError::IoError(_)) => 500,
            RequestError::AccessDenied(_) => 403,
            RequestError::NotAuthorized => 401,
            RequestError::Internal(_) => 500,
        }
    }

    pub fn description(&self) -> String {
        match self {
            RequestError::Verify(e) => e.description(),
            RequestError::Storage(StorageError::NotFound(d)) => d.clone(),
            RequestError::Storage(StorageError::InvalidRequest(d)) => d.clone(),
            RequestError::Storage(StorageError::IoError(e)) => e.to_string(),
            RequestError::AccessDenied(d) => d.clone(),
            RequestError::NotAuthorized => {
                "need authorization to access this service".to_string()
            }
            RequestError::Internal(d) => d.clone(),
        }
    }

    /// Challenge header value for 401 responses, where applicable
    pub fn challenge(&self) -> Option<String> {
        match self {
            RequestError::Verify(e) => Some(e.challenge()),
            RequestError::NotAuthorized => Some("Bearer realm=\"Resource Server\"".to_string()),
            _ => None,
        }
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}

impl std::error::Error for RequestError {}

impl From<VerifyError> for RequestError {
    fn from(error: VerifyError) -> Self {
        RequestError::Verify(error)
    }
}

impl From<StorageError> for RequestError {
    fn from(error: StorageError) -> Self {
        RequestError::Storage(error)
    }
}
