//! Server core functionality
//!
//! Accept loop and per-connection request handling.

pub mod core;

pub use core::Server;
