//! Scope authorization
//!
//! A granted scope is a space-separated set of `category:permission`
//! tokens; a token without a category (`:r`, `:rw`) is a wildcard that
//! applies to every category. Read-write grants imply read, read-only
//! grants never satisfy a write requirement.

use std::fmt;

use crate::error::VerifyError;

/// Permission a request requires on its category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Read,
    ReadWrite,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Permission::Read => write!(f, "read"),
            Permission::ReadWrite => write!(f, "read-write"),
        }
    }
}

/// Check the granted scope string for the required permission on the
/// category. With no category only the wildcard grants apply.
pub fn require_scope(
    category: Option<&str>,
    permission: Permission,
    granted: &str,
) -> Result<(), VerifyError> {
    let tokens: Vec<&str> = granted.split(' ').collect();

    let mut accepted: Vec<String> = Vec::new();
    if let Some(category) = category {
        accepted.push(format!("{}:rw", category));
        if permission == Permission::Read {
            accepted.push(format!("{}:r", category));
        }
    }
    // Wildcard grants satisfy any category at equal-or-lesser permission
    accepted.push(":rw".to_string());
    if permission == Permission::Read {
        accepted.push(":r".to_string());
    }

    if tokens.iter().any(|t| accepted.iter().any(|a| a == t)) {
        Ok(())
    } else {
        Err(VerifyError::InsufficientScope {
            category: category.map(|c| c.to_string()),
            permission,
            granted: granted.to_string(),
        })
    }
}
