//! Reference-counted removal of a direct dependency and everything that
//! only it kept alive.

use pluto_schema::{LockFile, PackageName, ProjectManifest, ReverseMapKey};

use crate::error::{PlutoError, Result};
use crate::fsutil;
use crate::project::Project;
use crate::reporter::Reporter;

/// Targets dropped by one removal, in the order they were struck.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Removal {
    pub removed: Vec<ReverseMapKey>,
}

/// Drop `name` from `manifest` and prune `lock` round by round until no
/// target is left without a parent.
///
/// Nothing is mutated if `name` is not a direct dependency or is not
/// installed.
pub fn cascade(
    name: &PackageName,
    manifest: &mut ProjectManifest,
    lock: &mut LockFile,
) -> Result<Removal> {
    let spec = manifest
        .dependencies
        .get(name)
        .ok_or_else(|| PlutoError::DependencyNotFound(name.clone()))?;
    let root_key = ReverseMapKey::new(name, spec);
    if !lock.contains(&root_key) {
        return Err(PlutoError::NotInstalled(root_key.to_string()));
    }

    manifest.unpin(name);

    let mut removal = Removal::default();
    let mut round = vec![root_key];
    while !round.is_empty() {
        for key in &round {
            lock.flat_package_list.retain(|k| k != key);
            lock.real_package_list.retain(|p| &p.reverse_map_key != key);
            for package in &mut lock.real_package_list {
                package.detach(key);
            }
        }
        tracing::debug!(
            "Removal round: {}",
            round.iter().map(ReverseMapKey::as_str).collect::<Vec<_>>().join(", ")
        );
        removal.removed.append(&mut round);

        round = lock
            .real_package_list
            .iter()
            .filter(|p| p.is_orphaned())
            .map(|p| p.reverse_map_key.clone())
            .collect();
    }

    Ok(removal)
}

/// Remove `name` from `project`, delete the freed directories and persist
/// the manifest and lock.
pub async fn remove(
    project: &mut Project,
    name: &PackageName,
    reporter: &dyn Reporter,
) -> Result<Removal> {
    let Some(lock) = project.lock.as_mut() else {
        if project.manifest.dependencies.contains_key(name) {
            return Err(PlutoError::NotInstalled(name.to_string()));
        }
        return Err(PlutoError::DependencyNotFound(name.clone()));
    };

    let removal = cascade(name, &mut project.manifest, lock)?;

    for key in &removal.removed {
        let dir = project.layout.install_dir(key);
        match fsutil::remove_all(&dir) {
            Ok(_) => reporter.removed(key),
            Err(e) => reporter.warning(&format!("Could not delete {}: {e}", dir.display())),
        }
    }

    project.save_manifest().await?;
    project.save_lock().await?;
    Ok(removal)
}
