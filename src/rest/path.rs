//! Storage path model
//!
//! Parses a request's path-info into its remoteStorage parts following
//! the `/{owner}[/public]/{category}/{item...}` grammar. Parsing is a
//! total function: malformed or adversarial input degrades to "no
//! owner / no category", which authorization then denies safely.

/// A parsed storage path, immutable once built
#[derive(Debug, Clone, PartialEq)]
pub struct StoragePath {
    /// First path segment, the account namespace
    pub resource_owner: Option<String>,
    /// Second segment equals the literal "public"
    pub public: bool,
    /// Storage category: segment 2 when public, segment 1 otherwise
    pub category: Option<String>,
    /// Path-info ends with a separator
    pub directory: bool,
    /// Original path-info, used verbatim to address the backend
    pub raw: String,
}

impl StoragePath {
    /// Parse a path-info string. Never fails; absent segments yield
    /// `None` and a too-short path yields no derived fields at all.
    pub fn parse(path_info: Option<&str>) -> StoragePath {
        let raw = path_info.unwrap_or("").to_string();

        let Some(path_info) = path_info.filter(|p| p.len() > 1) else {
            return StoragePath {
                resource_owner: None,
                public: false,
                category: None,
                directory: false,
                raw,
            };
        };

        let stripped = path_info.strip_prefix('/').unwrap_or(path_info);
        let segments: Vec<&str> = stripped.split('/').collect();

        let public = segments.get(1).is_some_and(|s| *s == "public");
        let category_index = if public { 2 } else { 1 };

        StoragePath {
            resource_owner: segments.first().map(|s| s.to_string()),
            public,
            category: segments.get(category_index).map(|s| s.to_string()),
            directory: segments.last().is_some_and(|s| s.is_empty()),
            raw,
        }
    }

    pub fn category_deref(&self) -> Option<&str> {
        self.category.as_deref()
    }
}
