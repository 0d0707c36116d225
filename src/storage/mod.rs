//! File system storage backend
//!
//! Performs the physical file operations under the configured root
//! directory, together with the MIME side-metadata that accompanies
//! every stored file.

pub mod metadata;
pub mod operations;
pub mod results;

pub use metadata::{MetadataStore, MetadataTree};
pub use operations::{DEFAULT_MIME_TYPE, Storage};
pub use results::{DirectoryListing, RetrieveResult};
