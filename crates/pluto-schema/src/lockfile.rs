//! The lockfile (`pluto.lock`): the durable record of what is actually
//! materialized in a project's module directory.

use serde::{Deserialize, Serialize};

use crate::types::PackageName;
use crate::version::{ReverseMapKey, VersionSpec};

/// The literal attribution written for direct project dependencies.
pub const ROOT_ATTRIBUTION: &str = "root";

/// Who keeps a resolved package installed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Attribution {
    /// A direct dependency of the project manifest.
    Root,
    /// A transitive dependency declared by the package with this key.
    Parent(ReverseMapKey),
}

impl From<String> for Attribution {
    fn from(s: String) -> Self {
        if s == ROOT_ATTRIBUTION {
            Self::Root
        } else {
            Self::Parent(ReverseMapKey::from_stored(s))
        }
    }
}

impl From<Attribution> for String {
    fn from(a: Attribution) -> Self {
        match a {
            Attribution::Root => ROOT_ATTRIBUTION.to_string(),
            Attribution::Parent(key) => key.to_string(),
        }
    }
}

impl std::fmt::Display for Attribution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Root => f.write_str(ROOT_ATTRIBUTION),
            Self::Parent(key) => write!(f, "{key}"),
        }
    }
}

/// One install target produced by resolution and recorded in the lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPackage {
    /// Package name.
    pub name: PackageName,
    /// The pin this target was resolved from.
    pub version: VersionSpec,
    /// Distinct parents that require this target. Never contains duplicates.
    pub installed_by: Vec<Attribution>,
    /// Canonical identity of `(name, version)`.
    #[serde(rename = "reverseMap")]
    pub reverse_map_key: ReverseMapKey,
    /// Concrete revision checked out at install time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installed_commit: Option<String>,
}

impl ResolvedPackage {
    /// Create a target attributed to a single parent.
    pub fn new(name: PackageName, version: VersionSpec, parent: Attribution) -> Self {
        let reverse_map_key = ReverseMapKey::new(&name, &version);
        Self {
            name,
            version,
            installed_by: vec![parent],
            reverse_map_key,
            installed_commit: None,
        }
    }

    /// Record another parent. Returns `false` if it was already recorded.
    pub fn attribute(&mut self, parent: Attribution) -> bool {
        if self.installed_by.contains(&parent) {
            return false;
        }
        self.installed_by.push(parent);
        true
    }

    /// Drop the edge from `parent`, if present.
    pub fn detach(&mut self, parent: &ReverseMapKey) {
        self.installed_by
            .retain(|a| !matches!(a, Attribution::Parent(k) if k == parent));
    }

    /// A target nothing requires any more must be removed.
    pub fn is_orphaned(&self) -> bool {
        self.installed_by.is_empty()
    }

    /// Returns `true` if the project depends on this target directly.
    pub fn is_direct(&self) -> bool {
        self.installed_by.contains(&Attribution::Root)
    }
}

/// Contents of `pluto.lock`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockFile {
    /// Every installed identity.
    #[serde(default)]
    pub flat_package_list: Vec<ReverseMapKey>,
    /// Every installed target with its attribution.
    #[serde(default)]
    pub real_package_list: Vec<ResolvedPackage>,
}

impl LockFile {
    /// Returns `true` if `key` is recorded in the flat list.
    pub fn contains(&self, key: &ReverseMapKey) -> bool {
        self.flat_package_list.contains(key)
    }

    /// Find the target recorded under `key`.
    pub fn find(&self, key: &ReverseMapKey) -> Option<&ResolvedPackage> {
        self.real_package_list
            .iter()
            .find(|p| &p.reverse_map_key == key)
    }

    /// Returns `true` if nothing is installed.
    pub fn is_empty(&self) -> bool {
        self.flat_package_list.is_empty() && self.real_package_list.is_empty()
    }
}
