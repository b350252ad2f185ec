//! Read access to the metadata mirror.
//!
//! The resolver only needs "give me the manifest for this name", so that
//! is the seam: [`ManifestSource`]. [`MetadataStore`] answers it from the
//! registry clone under `PLUTO_HOME` using the mapping cache to find the
//! package's folder.

use pluto_schema::{ModuleMapping, PackageManifest, PackageName};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::{PlutoError, Result};
use crate::fsutil;
use crate::paths::HomeLayout;

/// Anything that can hand out package manifests by name.
pub trait ManifestSource: Send + Sync {
    fn package_manifest(&self, name: &PackageName) -> Result<Arc<PackageManifest>>;
}

/// Manifests read from the local registry clone, memoized per name.
#[derive(Debug)]
pub struct MetadataStore {
    home: HomeLayout,
    mapping: ModuleMapping,
    loaded: Mutex<HashMap<PackageName, Arc<PackageManifest>>>,
}

impl MetadataStore {
    /// Open the store. Fails if `pluto fetch` has never run.
    pub fn open(home: HomeLayout) -> Result<Self> {
        let mapping = load_mapping(&home)?;
        Ok(Self::with_mapping(home, mapping))
    }

    pub fn with_mapping(home: HomeLayout, mapping: ModuleMapping) -> Self {
        Self {
            home,
            mapping,
            loaded: Mutex::new(HashMap::new()),
        }
    }

    pub fn mapping(&self) -> &ModuleMapping {
        &self.mapping
    }

    pub fn home(&self) -> &HomeLayout {
        &self.home
    }

    /// Every available manifest, skipping folders that fail to parse.
    pub fn all_manifests(&self) -> Vec<Arc<PackageManifest>> {
        self.mapping
            .available_packages
            .iter()
            .filter_map(|name| match self.package_manifest(name) {
                Ok(m) => Some(m),
                Err(e) => {
                    tracing::warn!("Skipping {name}: {e}");
                    None
                }
            })
            .collect()
    }
}

impl ManifestSource for MetadataStore {
    fn package_manifest(&self, name: &PackageName) -> Result<Arc<PackageManifest>> {
        if let Some(hit) = self
            .loaded
            .lock()
            .ok()
            .and_then(|cache| cache.get(name).cloned())
        {
            return Ok(hit);
        }

        let folder = self
            .mapping
            .folder_for(name)
            .ok_or_else(|| PlutoError::PackageNotAvailable(name.clone()))?;
        let path = self.home.package_manifest(folder);
        if !path.exists() {
            return Err(PlutoError::ManifestNotFound(path));
        }

        let manifest: Arc<PackageManifest> = Arc::new(fsutil::read_json(&path)?);
        if let Ok(mut cache) = self.loaded.lock() {
            cache.insert(name.clone(), Arc::clone(&manifest));
        }
        Ok(manifest)
    }
}

/// Load `moduleMap.json`.
pub fn load_mapping(home: &HomeLayout) -> Result<ModuleMapping> {
    let path = home.mapping_file();
    if !path.exists() {
        return Err(PlutoError::MetadataMissing(path));
    }
    fsutil::read_json(&path)
}

/// Load `moduleMap.json`, or an empty mapping if it does not exist yet.
pub fn load_mapping_or_default(home: &HomeLayout) -> Result<ModuleMapping> {
    match load_mapping(home) {
        Err(PlutoError::MetadataMissing(_)) => Ok(ModuleMapping::default()),
        other => other,
    }
}

pub fn save_mapping(home: &HomeLayout, mapping: &ModuleMapping) -> Result<()> {
    fsutil::write_json_atomic(&home.mapping_file(), mapping)
}

/// Write a package manifest into the registry layout under `folder`.
pub fn write_package_manifest(
    home: &HomeLayout,
    folder: &str,
    manifest: &PackageManifest,
) -> Result<()> {
    let path = home.package_manifest(folder);
    fsutil::write_json_atomic(&path, manifest)
}
