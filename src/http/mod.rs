//! Minimal HTTP/1.1 message handling
//!
//! Reads one request from a buffered stream and writes one response back.
//! Only the subset of HTTP the remoteStorage protocol needs is covered;
//! every connection carries a single request and is closed afterwards.

pub mod request;
pub mod response;

pub use request::{HeaderMap, Request, read_request};
pub use response::Response;
