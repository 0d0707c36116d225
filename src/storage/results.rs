//! Storage result types
//!
//! Defines result structures returned by storage operations.

use std::collections::HashMap;

/// Result of a file retrieval operation
#[derive(Debug, Clone)]
pub struct RetrieveResult {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// Directory listing: entry name (trailing "/" for directories) mapped
/// to last-modified time in seconds since the epoch. Unordered.
pub type DirectoryListing = HashMap<String, u64>;
