//! Error handling
//!
//! Defines error types for each module of the remoteStorage server and
//! their mapping onto the HTTP error surface.

pub mod types;

pub use types::*;
