//! HTTP accept loop
//!
//! One tokio task per connection, one request per connection. No state
//! is shared between requests beyond the filesystem itself.

use log::{error, info, warn};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::net::{TcpListener, TcpStream};

use crate::config::ServerConfig;
use crate::error::HttpError;
use crate::http::{Response, read_request};
use crate::oauth::TokenVerifier;
use crate::rest::{AppState, handle_request};
use crate::storage::Storage;

pub struct Server {
    listener: TcpListener,
    state: Arc<AppState>,
    max_body_size: usize,
}

impl Server {
    /// Create the storage root, bind the listener and assemble the
    /// shared application state.
    pub async fn bind(config: ServerConfig) -> io::Result<Self> {
        let socket = config.listen_socket();
        let listener = match TcpListener::bind(&socket).await {
            Ok(listener) => {
                info!("Server bound to {}", socket);
                listener
            }
            Err(e) => {
                error!("Failed to bind to {}: {}", socket, e);
                return Err(e);
            }
        };

        let files_directory = config.files_directory_path();
        std::fs::create_dir_all(&files_directory)?;
        info!("Storage root: {}", files_directory.display());

        let state = Arc::new(AppState {
            storage: Storage::new(&files_directory),
            verifier: TokenVerifier::new(&config.oauth_token_endpoint),
        });

        Ok(Self {
            listener,
            state,
            max_body_size: config.max_body_size,
        })
    }

    /// Address the listener actually bound to
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections forever, spawning a task per connection so
    /// the accept loop never blocks on a slow client.
    pub async fn run(&self) {
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let state = Arc::clone(&self.state);
                    let max_body_size = self.max_body_size;
                    tokio::spawn(async move {
                        handle_connection(state, stream, addr, max_body_size).await;
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                }
            }
        }
    }
}

/// Serve a single request and close the connection
async fn handle_connection(
    state: Arc<AppState>,
    stream: TcpStream,
    addr: SocketAddr,
    max_body_size: usize,
) {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    let response = match read_request(&mut reader, max_body_size).await {
        Ok(request) => {
            let response = handle_request(&state, &request).await;
            info!(
                "{} {} from {} -> {}",
                request.method, request.path_info, addr, response.status
            );
            response
        }
        Err(HttpError::IoError(e)) => {
            warn!("Connection from {} dropped: {}", addr, e);
            return;
        }
        Err(e) => {
            warn!("Rejected request from {}: {}", addr, e);
            bad_request_response(&e)
        }
    };

    if let Err(e) = response.write_to(&mut write_half).await {
        warn!("Failed to write response to {}: {}", addr, e);
    }
}

fn bad_request_response(error: &HttpError) -> Response {
    let mut response = Response::new();
    response.status = 400;
    response.set_body(
        serde_json::json!({
            "error": "invalid_request",
            "error_description": error.to_string(),
        })
        .to_string()
        .into_bytes(),
    );
    response
}
