//! The local mapping cache (`moduleMap.json`).
//!
//! Rebuilt by `pluto fetch` from the registry checkout; everything else
//! only reads it, except for the `cachedPackages` index which the install
//! engine extends.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::PackageName;

/// Bidirectional index between package names and registry folders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleMapping {
    /// Every package the registry offers.
    #[serde(default)]
    pub available_packages: Vec<PackageName>,
    /// Packages whose workspace has been checked out on this machine.
    #[serde(default)]
    pub cached_packages: Vec<PackageName>,
    /// Package name to registry folder.
    #[serde(default)]
    pub package_to_folder_map: BTreeMap<PackageName, String>,
    /// Registry folder to package name.
    #[serde(default)]
    pub folder_to_package_map: BTreeMap<String, PackageName>,
}

impl ModuleMapping {
    /// Registry folder holding `name`'s metadata.
    pub fn folder_for(&self, name: &PackageName) -> Option<&str> {
        self.package_to_folder_map.get(name).map(String::as_str)
    }

    /// Returns `true` if the registry offers `name`.
    pub fn is_available(&self, name: &PackageName) -> bool {
        self.available_packages.contains(name)
    }

    /// Returns `true` if `name`'s workspace exists locally.
    pub fn is_cached(&self, name: &PackageName) -> bool {
        self.cached_packages.contains(name)
    }

    /// Record a package found in the registry under `folder`.
    pub fn register(&mut self, name: PackageName, folder: &str) {
        if !self.available_packages.contains(&name) {
            self.available_packages.push(name.clone());
        }
        self.package_to_folder_map
            .insert(name.clone(), folder.to_string());
        self.folder_to_package_map.insert(folder.to_string(), name);
    }

    /// Record that `name` has a local workspace. Idempotent.
    pub fn mark_cached(&mut self, name: &PackageName) -> bool {
        if self.is_cached(name) {
            return false;
        }
        self.cached_packages.push(name.clone());
        true
    }
}
