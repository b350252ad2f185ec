//! Metadata sync (`pluto fetch`).

use pluto_schema::{ModuleMapping, PackageManifest};
use std::fs;

use crate::error::{IoContext, Result};
use crate::fsutil;
use crate::paths::HomeLayout;
use crate::reporter::Reporter;
use crate::store;
use crate::vcs::Vcs;

/// Clone or update the registry, then rebuild `moduleMap.json` from it.
pub fn fetch(
    home: &HomeLayout,
    registry_url: &str,
    vcs: &dyn Vcs,
    reporter: &dyn Reporter,
) -> Result<ModuleMapping> {
    let metadata = home.metadata_dir();
    if metadata.join(fsutil::VCS_DIR).exists() {
        reporter.info("Updating package registry");
        vcs.fetch(&metadata)?;
        vcs.pull(&metadata)?;
    } else {
        reporter.info(&format!("Cloning package registry from {registry_url}"));
        fsutil::remove_all(&metadata)?;
        fsutil::ensure_dir(home.root())?;
        vcs.clone_repo(registry_url, &metadata)?;
    }

    let previous = store::load_mapping_or_default(home)?;
    let mapping = rebuild_mapping(home, &previous)?;
    store::save_mapping(home, &mapping)?;

    reporter.success(&format!(
        "{} packages available",
        mapping.available_packages.len()
    ));
    Ok(mapping)
}

/// Index every `packages/<folder>/manifest.json`, keeping the cached list
/// for packages that still exist.
pub fn rebuild_mapping(home: &HomeLayout, previous: &ModuleMapping) -> Result<ModuleMapping> {
    let packages = home.packages_dir();
    let mut mapping = ModuleMapping::default();
    if !packages.is_dir() {
        return Ok(mapping);
    }

    let mut folders: Vec<_> = fs::read_dir(&packages)
        .at(&packages)?
        .filter_map(std::result::Result::ok)
        .filter(|e| e.path().is_dir())
        .filter_map(|e| e.file_name().into_string().ok())
        .collect();
    folders.sort();

    for folder in folders {
        let path = home.package_manifest(&folder);
        if !path.exists() {
            continue;
        }
        match fsutil::read_json::<PackageManifest>(&path) {
            Ok(manifest) => mapping.register(manifest.name, &folder),
            Err(e) => tracing::warn!("Skipping {folder}: {e}"),
        }
    }

    mapping.cached_packages = previous
        .cached_packages
        .iter()
        .filter(|name| mapping.is_available(name))
        .cloned()
        .collect();

    Ok(mapping)
}
