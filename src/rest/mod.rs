//! remoteStorage REST protocol
//!
//! Turns a request path into its storage semantics and dispatches the
//! request through authorization onto the storage backend.

pub mod handlers;
pub mod path;

pub use handlers::{AppState, handle_request};
pub use path::StoragePath;
