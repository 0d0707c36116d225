//! MIME side-metadata store
//!
//! The MIME type of a stored file lives outside the file contents, in a
//! pluggable key-value store keyed by file path. The shipped
//! implementation mirrors the storage tree under a reserved
//! `.metadata/` directory that path resolution refuses to address, so
//! no client path can alias a metadata entry and listings never need
//! filtering. Platforms with extended-attribute support can slot in a
//! different store behind the same trait.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Directory under the storage root holding the metadata tree.
/// `Storage::resolve` rejects this segment in client paths.
pub const METADATA_DIR: &str = ".metadata";

/// Side-store for per-file MIME metadata
pub trait MetadataStore {
    fn set_mime(&self, file: &Path, mime_type: &str) -> io::Result<()>;

    /// Stored MIME type for the file, if any was recorded
    fn get_mime(&self, file: &Path) -> io::Result<Option<String>>;

    fn remove_mime(&self, file: &Path) -> io::Result<()>;
}

/// Metadata store mirroring the file tree under `.metadata/`
#[derive(Debug, Clone)]
pub struct MetadataTree {
    files_root: PathBuf,
    tree_root: PathBuf,
}

impl MetadataTree {
    pub fn new(files_root: &Path) -> Self {
        Self {
            files_root: files_root.to_path_buf(),
            tree_root: files_root.join(METADATA_DIR),
        }
    }

    /// Metadata entry mirroring the stored file's path under the tree
    fn entry_path(&self, file: &Path) -> io::Result<PathBuf> {
        let relative = file.strip_prefix(&self.files_root).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "file is outside the storage root",
            )
        })?;
        Ok(self.tree_root.join(relative))
    }
}

impl MetadataStore for MetadataTree {
    fn set_mime(&self, file: &Path, mime_type: &str) -> io::Result<()> {
        let entry = self.entry_path(file)?;
        if let Some(parent) = entry.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(entry, mime_type)
    }

    fn get_mime(&self, file: &Path) -> io::Result<Option<String>> {
        match fs::read_to_string(self.entry_path(file)?) {
            Ok(mime_type) => Ok(Some(mime_type)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn remove_mime(&self, file: &Path) -> io::Result<()> {
        match fs::remove_file(self.entry_path(file)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn roundtrips_mime_through_the_tree() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("alice/docs/a.txt");

        let store = MetadataTree::new(dir.path());
        assert_eq!(store.get_mime(&file).unwrap(), None);

        store.set_mime(&file, "text/markdown").unwrap();
        assert_eq!(
            store.get_mime(&file).unwrap().as_deref(),
            Some("text/markdown")
        );
        // The entry mirrors the file's path under the reserved tree,
        // never next to the file itself
        assert!(dir.path().join(".metadata/alice/docs/a.txt").is_file());
        assert!(!dir.path().join("alice/docs/a.txt.mime").exists());

        store.remove_mime(&file).unwrap();
        assert_eq!(store.get_mime(&file).unwrap(), None);
        // Removing again stays a no-op
        store.remove_mime(&file).unwrap();
    }

    #[test]
    fn rejects_files_outside_the_root() {
        let dir = tempdir().unwrap();
        let store = MetadataTree::new(dir.path());
        let outside = Path::new("/elsewhere/a.txt");
        assert!(store.set_mime(outside, "text/plain").is_err());
        assert!(store.get_mime(outside).is_err());
    }
}
