//! Request dispatcher for the remoteStorage protocol.
//!
//! Sequences the per-request state machine: CORS preflight, the public
//! read carve-out, token verification, ownership and scope checks, and
//! finally the storage operation. Checks fail fast in that order;
//! ownership before scope, scope before I/O.

use log::error;

use crate::error::{RequestError, StorageError};
use crate::http::{Request, Response};
use crate::oauth::{Permission, TokenVerifier, VerifiedToken, require_scope};
use crate::rest::path::StoragePath;
use crate::storage::{DEFAULT_MIME_TYPE, Storage};

/// Everything a request needs beyond its own data. Shared across
/// connections; holds no per-request state.
pub struct AppState {
    pub storage: Storage,
    pub verifier: TokenVerifier,
}

/// Handle one parsed request, turning any failure into its error
/// response at this boundary.
pub async fn handle_request(state: &AppState, request: &Request) -> Response {
    match dispatch(state, request).await {
        Ok(response) => response,
        Err(e) => {
            if e.http_status() == 500 {
                error!(
                    "Internal error on {} {}: {}",
                    request.method, request.path_info, e
                );
            }
            Response::from_error(&e)
        }
    }
}

async fn dispatch(state: &AppState, request: &Request) -> Result<Response, RequestError> {
    if request.method == "OPTIONS" {
        return Ok(handle_options());
    }

    let path = StoragePath::parse(Some(&request.path_info));

    match request.authorization() {
        Some(header) => {
            let token = state.verifier.verify(header).await?;
            match request.method.as_str() {
                "GET" => handle_get(state, &path, &token),
                "PUT" => handle_put(state, request, &path, &token),
                "DELETE" => handle_delete(state, &path, &token),
                // Anything else is a no-op carrying the default status
                _ => Ok(Response::new()),
            }
        }
        None if path.public => handle_public_get(state, request, &path),
        None => Err(RequestError::NotAuthorized),
    }
}

/// CORS preflight: headers only, no body
fn handle_options() -> Response {
    let mut response = Response::new();
    response.set_header(
        "Access-Control-Allow-Headers",
        "Content-Type, Authorization, Origin",
    );
    response.set_header("Access-Control-Allow-Methods", "GET, PUT, DELETE");
    response
}

/// Unauthenticated access to a public path: only GET of a non-directory
/// item is served; everything else still needs a token.
fn handle_public_get(
    state: &AppState,
    request: &Request,
    path: &StoragePath,
) -> Result<Response, RequestError> {
    if request.method != "GET" {
        return Err(RequestError::NotAuthorized);
    }
    if path.directory {
        return Err(StorageError::InvalidRequest(
            "not allowed to list contents of a public folder".to_string(),
        )
        .into());
    }
    let result = state.storage.retrieve(&path.raw)?;
    Ok(file_response(result.bytes, &result.mime_type))
}

fn handle_get(
    state: &AppState,
    path: &StoragePath,
    token: &VerifiedToken,
) -> Result<Response, RequestError> {
    check_owner(path, token)?;
    require_scope(path.category_deref(), Permission::Read, &token.scope)?;

    if path.directory {
        let listing = state.storage.list(&path.raw)?;
        let mut response = Response::new();
        // HashMap serializes as a JSON object, {} when empty
        response.set_body(
            serde_json::to_vec(&listing).map_err(|e| RequestError::Internal(e.to_string()))?,
        );
        Ok(response)
    } else {
        let result = state.storage.retrieve(&path.raw)?;
        Ok(file_response(result.bytes, &result.mime_type))
    }
}

fn handle_put(
    state: &AppState,
    request: &Request,
    path: &StoragePath,
    token: &VerifiedToken,
) -> Result<Response, RequestError> {
    check_owner(path, token)?;
    state.storage.ensure_owner_root(&token.resource_owner_id)?;
    require_scope(path.category_deref(), Permission::ReadWrite, &token.scope)?;

    if path.directory {
        return Err(StorageError::InvalidRequest(
            "cannot store a directory".to_string(),
        )
        .into());
    }

    let mime_type = request.content_type().unwrap_or(DEFAULT_MIME_TYPE);
    state.storage.store(&path.raw, &request.body, mime_type)?;
    Ok(Response::new())
}

fn handle_delete(
    state: &AppState,
    path: &StoragePath,
    token: &VerifiedToken,
) -> Result<Response, RequestError> {
    check_owner(path, token)?;
    require_scope(path.category_deref(), Permission::ReadWrite, &token.scope)?;

    if path.directory {
        return Err(StorageError::InvalidRequest(
            "cannot delete a directory".to_string(),
        )
        .into());
    }

    state.storage.remove(&path.raw)?;
    Ok(Response::new())
}

/// The owner path segment must name the token's resource owner
fn check_owner(path: &StoragePath, token: &VerifiedToken) -> Result<(), RequestError> {
    if path.resource_owner.as_deref() == Some(token.resource_owner_id.as_str()) {
        Ok(())
    } else {
        Err(RequestError::AccessDenied(
            "you are not allowed to access files not belonging to you".to_string(),
        ))
    }
}

fn file_response(bytes: Vec<u8>, mime_type: &str) -> Response {
    let mut response = Response::new();
    response.set_header("Content-Type", mime_type);
    response.set_body(bytes);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HeaderMap;
    use crate::storage::Storage;
    use tempfile::tempdir;

    fn state(dir: &tempfile::TempDir) -> AppState {
        AppState {
            storage: Storage::new(dir.path()),
            // Never reached by the requests these tests send
            verifier: TokenVerifier::new("http://127.0.0.1:1/introspect"),
        }
    }

    fn request(method: &str, path_info: &str) -> Request {
        Request {
            method: method.to_string(),
            path_info: path_info.to_string(),
            query: None,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    #[tokio::test]
    async fn options_carries_cors_headers_and_no_body() {
        let dir = tempdir().unwrap();
        let response = handle_request(&state(&dir), &request("OPTIONS", "/alice/docs/")).await;
        assert_eq!(response.status, 200);
        assert_eq!(
            response.header("Access-Control-Allow-Methods"),
            Some("GET, PUT, DELETE")
        );
        assert_eq!(
            response.header("Access-Control-Allow-Headers"),
            Some("Content-Type, Authorization, Origin")
        );
        assert!(response.body.is_empty());
    }

    #[tokio::test]
    async fn public_file_is_served_without_token() {
        let dir = tempdir().unwrap();
        let state = state(&dir);
        state
            .storage
            .store("/alice/public/photos/a.png", b"png-bytes", "image/png")
            .unwrap();

        let response =
            handle_request(&state, &request("GET", "/alice/public/photos/a.png")).await;
        assert_eq!(response.status, 200);
        assert_eq!(response.header("Content-Type"), Some("image/png"));
        assert_eq!(response.body, b"png-bytes");
    }

    #[tokio::test]
    async fn public_directory_listing_without_token_is_invalid() {
        let dir = tempdir().unwrap();
        let response =
            handle_request(&state(&dir), &request("GET", "/alice/public/photos/")).await;
        assert_eq!(response.status, 400);
        let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(body["error"], "invalid_request");
    }

    #[tokio::test]
    async fn public_put_without_token_is_unauthorized() {
        let dir = tempdir().unwrap();
        let response =
            handle_request(&state(&dir), &request("PUT", "/alice/public/photos/a.png")).await;
        assert_eq!(response.status, 401);
    }

    #[tokio::test]
    async fn private_request_without_token_gets_challenge() {
        let dir = tempdir().unwrap();
        let response = handle_request(&state(&dir), &request("GET", "/alice/docs/a.txt")).await;
        assert_eq!(response.status, 401);
        assert_eq!(
            response.header("WWW-Authenticate"),
            Some("Bearer realm=\"Resource Server\"")
        );
        let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(body["error"], "not_authorized");
    }
}
