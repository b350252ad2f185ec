//! Editing a project's direct dependencies: add, lock and unlock.
//!
//! Edits only touch `module.json`. They take effect on the next
//! `install` (new names) or `update` (re-pinned names).

use pluto_schema::{CompatReport, PackageManifest, PackageName, ProjectManifest, VersionSpec};
use std::sync::Arc;

use crate::error::{PlutoError, Result};
use crate::store::ManifestSource;

/// Check that `spec` names something that exists in `manifest`'s history.
///
/// Tags must match exactly. A commit must be a prefix of exactly one known
/// hash.
pub fn validate_spec(manifest: &PackageManifest, spec: &VersionSpec) -> Result<()> {
    match spec {
        VersionSpec::Latest => Ok(()),
        VersionSpec::Tag(tag) if manifest.has_tag(tag) => Ok(()),
        VersionSpec::Tag(tag) => Err(PlutoError::VersionNotFound {
            name: manifest.name.clone(),
            requested: tag.clone(),
            available: manifest.tags.clone(),
        }),
        VersionSpec::Commit(prefix) => {
            let matches: Vec<&str> = manifest.commits_matching(prefix).collect();
            if matches.len() == 1 {
                return Ok(());
            }
            let available = if matches.is_empty() {
                manifest.all_commit_hashes.clone()
            } else {
                matches.into_iter().map(str::to_string).collect()
            };
            Err(PlutoError::VersionNotFound {
                name: manifest.name.clone(),
                requested: prefix.clone(),
                available,
            })
        }
    }
}

/// A validated dependency, ready to be written into the project.
#[derive(Debug, Clone)]
pub struct AddPlan {
    pub name: PackageName,
    pub spec: VersionSpec,
    pub manifest: Arc<PackageManifest>,
    /// Advisory: the caller decides whether to proceed on a mismatch.
    pub compat: CompatReport,
}

/// Look `name` up, validate `spec` and check it against the project.
pub fn plan_add(
    project: &ProjectManifest,
    source: &dyn ManifestSource,
    name: &PackageName,
    spec: VersionSpec,
) -> Result<AddPlan> {
    let manifest = source.package_manifest(name)?;
    validate_spec(&manifest, &spec)?;
    let compat = CompatReport::check(&manifest, project);
    Ok(AddPlan {
        name: name.clone(),
        spec,
        manifest,
        compat,
    })
}

/// Write the planned dependency. Returns the pin it replaced, if any.
pub fn apply_add(project: &mut ProjectManifest, plan: AddPlan) -> Option<VersionSpec> {
    project.pin(plan.name, plan.spec)
}

/// Re-pin an existing direct dependency. Returns the previous pin.
pub fn lock(
    project: &mut ProjectManifest,
    source: &dyn ManifestSource,
    name: &PackageName,
    spec: VersionSpec,
) -> Result<VersionSpec> {
    if !project.dependencies.contains_key(name) {
        return Err(PlutoError::DependencyNotFound(name.clone()));
    }
    let manifest = source.package_manifest(name)?;
    validate_spec(&manifest, &spec)?;
    project
        .pin(name.clone(), spec)
        .ok_or_else(|| PlutoError::DependencyNotFound(name.clone()))
}

/// Re-pin an existing direct dependency to the default branch tip.
pub fn unlock(project: &mut ProjectManifest, name: &PackageName) -> Result<VersionSpec> {
    if !project.dependencies.contains_key(name) {
        return Err(PlutoError::DependencyNotFound(name.clone()));
    }
    project
        .pin(name.clone(), VersionSpec::Latest)
        .ok_or_else(|| PlutoError::DependencyNotFound(name.clone()))
}
