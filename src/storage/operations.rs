//! Storage operations
//!
//! The four physical operations against the storage root: retrieve,
//! store, list and remove. Every effective path is root-confined; the
//! raw path-info is joined under the root after traversal components
//! are rejected.

use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use crate::error::StorageError;
use crate::storage::metadata::{METADATA_DIR, MetadataStore, MetadataTree};
use crate::storage::results::{DirectoryListing, RetrieveResult};

/// MIME type assumed when no side-metadata was recorded
pub const DEFAULT_MIME_TYPE: &str = "application/json";

/// Storage backend rooted at the configured files directory
pub struct Storage {
    root: PathBuf,
    metadata: Box<dyn MetadataStore + Send + Sync>,
}

impl Storage {
    pub fn new(root: &Path) -> Self {
        Self::with_metadata_store(root, Box::new(MetadataTree::new(root)))
    }

    pub fn with_metadata_store(root: &Path, metadata: Box<dyn MetadataStore + Send + Sync>) -> Self {
        Self {
            root: root.to_path_buf(),
            metadata,
        }
    }

    /// Map a raw path-info onto the filesystem under the root,
    /// rejecting traversal-shaped input and the reserved metadata
    /// directory.
    fn resolve(&self, path_info: &str) -> Result<PathBuf, StorageError> {
        let relative = path_info.strip_prefix('/').unwrap_or(path_info);
        if relative
            .split('/')
            .any(|s| s == ".." || s == "." || s == METADATA_DIR)
        {
            return Err(StorageError::InvalidRequest(
                "path contains reserved or traversal segments".to_string(),
            ));
        }
        Ok(self.root.join(relative))
    }

    /// Idempotent creation of the resource owner's root directory
    pub fn ensure_owner_root(&self, resource_owner: &str) -> Result<(), StorageError> {
        let owner_root = self.resolve(resource_owner)?;
        fs::create_dir_all(owner_root)?;
        Ok(())
    }

    /// Read a file's bytes and its stored MIME type
    pub fn retrieve(&self, path_info: &str) -> Result<RetrieveResult, StorageError> {
        let path = self.resolve(path_info)?;
        if !path.is_file() {
            return Err(StorageError::NotFound("the file was not found".to_string()));
        }
        let bytes = fs::read(&path)?;
        let mime_type = self
            .metadata
            .get_mime(&path)?
            .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string());
        Ok(RetrieveResult { bytes, mime_type })
    }

    /// Write the body bytes, creating missing parent directories, and
    /// record the MIME type as side-metadata. Overwrites silently.
    pub fn store(&self, path_info: &str, bytes: &[u8], mime_type: &str) -> Result<(), StorageError> {
        let path = self.resolve(path_info)?;
        if path.is_dir() {
            return Err(StorageError::InvalidRequest(
                "target is a directory".to_string(),
            ));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, bytes)?;
        self.metadata.set_mime(&path, mime_type)?;
        info!("Stored {} ({} bytes, {})", path_info, bytes.len(), mime_type);
        Ok(())
    }

    /// List a directory as entry name -> mtime epoch seconds. A missing
    /// or non-directory target lists empty rather than failing.
    pub fn list(&self, path_info: &str) -> Result<DirectoryListing, StorageError> {
        let path = self.resolve(path_info)?;
        let mut listing = DirectoryListing::new();

        let entries = match fs::read_dir(&path) {
            Ok(entries) => entries,
            Err(_) => return Ok(listing),
        };

        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().to_string();
            let Ok(file_metadata) = entry.metadata() else {
                continue;
            };
            let modified = file_metadata
                .modified()
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_secs())
                // mtimes before the epoch clamp to 0
                .unwrap_or(0);
            let name = if file_metadata.is_dir() {
                format!("{}/", name)
            } else {
                name
            };
            listing.insert(name, modified);
        }

        Ok(listing)
    }

    /// Delete a file and its side-metadata
    pub fn remove(&self, path_info: &str) -> Result<(), StorageError> {
        let path = self.resolve(path_info)?;
        if !path.exists() {
            return Err(StorageError::NotFound("the file was not found".to_string()));
        }
        if !path.is_file() {
            return Err(StorageError::InvalidRequest(
                "target is not a file".to_string(),
            ));
        }
        fs::remove_file(&path)?;
        let _ = self.metadata.remove_mime(&path);
        info!("Deleted {}", path_info);
        Ok(())
    }
}
