//! OAuth2 bearer-token handling
//!
//! Verifies presented tokens against the remote authorization endpoint
//! and checks granted scopes against required permissions.

pub mod scope;
pub mod verifier;

pub use scope::{Permission, require_scope};
pub use verifier::{TokenVerifier, VerifiedToken};
