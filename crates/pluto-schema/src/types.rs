//! Identifier newtypes and validation errors.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;

use crate::FORBIDDEN_NAME_CHARS;

/// Errors raised while validating user-supplied identifiers.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// The package name is empty.
    #[error("Package name must not be empty")]
    EmptyName,

    /// The package name contains a character reserved for version keys.
    #[error("Package name '{name}' contains reserved character '{ch}'")]
    ReservedChar {
        /// The rejected name.
        name: String,
        /// The offending character.
        ch: char,
    },

    /// The package name collides with the `root` attribution marker.
    #[error("Package name 'root' is reserved")]
    ReservedName,

    /// A version spec did not set exactly one of `latest`, `gitTag`, `gitCommit`.
    #[error("Invalid version spec: {0}")]
    InvalidVersionSpec(String),
}

/// A package name as it appears in the registry and in manifests.
///
/// Unlike registry slugs elsewhere, names are case-sensitive: the mapping
/// cache keys folders by the exact name a package declares.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageName(String);

impl PackageName {
    /// Wrap a name without validation (used for names read from disk).
    pub fn new(name: &str) -> Self {
        Self(name.to_string())
    }

    /// Validate and wrap a name supplied on the command line.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] if the name is empty, is the reserved word
    /// `root`, or contains `@` / `#`.
    pub fn parse(name: &str) -> Result<Self, SchemaError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SchemaError::EmptyName);
        }
        if name == crate::lockfile::ROOT_ATTRIBUTION {
            return Err(SchemaError::ReservedName);
        }
        if let Some(ch) = name.chars().find(|c| FORBIDDEN_NAME_CHARS.contains(c)) {
            return Err(SchemaError::ReservedChar {
                name: name.to_string(),
                ch,
            });
        }
        Ok(Self(name.to_string()))
    }

    /// Return the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PackageName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::ops::Deref for PackageName {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for PackageName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for PackageName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for PackageName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for PackageName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl From<&str> for PackageName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for PackageName {
    fn from(s: String) -> Self {
        Self(s)
    }
}
