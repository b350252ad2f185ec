//! Project and package manifests.
//!
//! A project's `module.json` declares its target runtime, frameworks and
//! direct dependencies. Each package in the registry carries a richer
//! `manifest.json` describing its history (commits, tags) and its own
//! dependencies.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::PackageName;
use crate::version::VersionSpec;

/// Root manifest of a project (`module.json`).
///
/// Dependencies keep the order they are declared in. Rewriting the file
/// leaves out fields the user never set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "ProjectManifestWire", into = "ProjectManifestWire")]
pub struct ProjectManifest {
    /// Project name.
    pub name: String,
    /// Runtime the project runs on (e.g. `Lua5.4`).
    pub runtime: String,
    /// Frameworks the project runs under.
    pub frameworks: Vec<String>,
    /// Direct dependencies and their pins, in declared order.
    pub dependencies: IndexMap<PackageName, VersionSpec>,
    /// `installedCommit` recorded next to a direct pin, carried through
    /// rewrites until the pin changes.
    pub installed_commits: IndexMap<PackageName, String>,
    /// Fields this tool does not interpret, preserved on rewrite.
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ProjectManifest {
    /// Pin `name` to `spec`, keeping its position if it is already declared.
    /// Returns the pin it replaced.
    pub fn pin(&mut self, name: PackageName, spec: VersionSpec) -> Option<VersionSpec> {
        let previous = self.dependencies.insert(name.clone(), spec);
        if previous.as_ref() != self.dependencies.get(&name) {
            self.installed_commits.shift_remove(&name);
        }
        previous
    }

    /// Drop `name` from the direct dependencies. Returns its pin.
    pub fn unpin(&mut self, name: &PackageName) -> Option<VersionSpec> {
        self.installed_commits.shift_remove(name);
        self.dependencies.shift_remove(name)
    }
}

#[derive(Serialize, Deserialize)]
struct ProjectManifestWire {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    name: String,
    #[serde(default = "wildcard", skip_serializing_if = "is_unset_runtime")]
    runtime: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    frameworks: Vec<String>,
    #[serde(default)]
    dependencies: IndexMap<PackageName, DependencyWire>,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DependencyWire {
    #[serde(flatten)]
    spec: VersionSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    installed_commit: Option<String>,
}

impl From<ProjectManifestWire> for ProjectManifest {
    fn from(wire: ProjectManifestWire) -> Self {
        let mut dependencies = IndexMap::with_capacity(wire.dependencies.len());
        let mut installed_commits = IndexMap::new();
        for (name, dependency) in wire.dependencies {
            if let Some(commit) = dependency.installed_commit {
                installed_commits.insert(name.clone(), commit);
            }
            dependencies.insert(name, dependency.spec);
        }
        Self {
            name: wire.name,
            runtime: wire.runtime,
            frameworks: wire.frameworks,
            dependencies,
            installed_commits,
            extra: wire.extra,
        }
    }
}

impl From<ProjectManifest> for ProjectManifestWire {
    fn from(manifest: ProjectManifest) -> Self {
        let mut installed_commits = manifest.installed_commits;
        let dependencies = manifest
            .dependencies
            .into_iter()
            .map(|(name, spec)| {
                let installed_commit = installed_commits.shift_remove(&name);
                (name, DependencyWire { spec, installed_commit })
            })
            .collect();
        Self {
            name: manifest.name,
            runtime: manifest.runtime,
            frameworks: manifest.frameworks,
            dependencies,
            extra: manifest.extra,
        }
    }
}

fn wildcard() -> String {
    crate::compat::WILDCARD.to_string()
}

fn is_unset_runtime(runtime: &str) -> bool {
    runtime.is_empty() || runtime == crate::compat::WILDCARD
}

/// Author block of a package manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// GitHub profile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    /// Contact address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Registry-side manifest of a single package.
///
/// Immutable once read; refreshed wholesale by `pluto fetch`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
    /// Package name.
    pub name: PackageName,
    /// Package author.
    #[serde(default)]
    pub author: Author,
    /// License identifier.
    #[serde(default)]
    pub license: String,
    /// One-line description.
    #[serde(default)]
    pub description: String,
    /// Project website.
    #[serde(default)]
    pub website: String,
    /// Documentation URL.
    #[serde(default)]
    pub documentation: String,
    /// Source repository URL.
    #[serde(default)]
    pub github: String,
    /// Runtime the package targets.
    #[serde(default = "wildcard")]
    pub runtime: String,
    /// Frameworks the package targets.
    #[serde(default)]
    pub frameworks: Vec<String>,
    /// Size of the source tree in bytes.
    #[serde(default)]
    pub size: u64,
    /// Content hash of the source tree.
    #[serde(default)]
    pub hash: String,
    /// Tip of the default branch when the registry was last synced.
    #[serde(default)]
    pub latest_commit: String,
    /// Every full commit hash in the package's history.
    #[serde(default)]
    pub all_commit_hashes: Vec<String>,
    /// Every tag in the package's history.
    #[serde(default)]
    pub tags: Vec<String>,
    /// The package's own dependencies, in declared order.
    #[serde(default)]
    pub dependencies: IndexMap<PackageName, VersionSpec>,
}

impl PackageManifest {
    /// Returns `true` if `tag` is one of this package's tags.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Full hashes starting with `prefix`.
    pub fn commits_matching<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.all_commit_hashes
            .iter()
            .map(String::as_str)
            .filter(move |h| !prefix.is_empty() && h.starts_with(prefix))
    }

    /// Abbreviated latest commit for display.
    pub fn short_latest_commit(&self) -> &str {
        self.latest_commit
            .get(..8)
            .unwrap_or(&self.latest_commit)
    }
}
