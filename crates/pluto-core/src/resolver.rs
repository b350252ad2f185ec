//! Breadth-first expansion of a project's dependency graph.
//!
//! Every `(name, version)` pair is expanded at most once. When a second
//! parent reaches a key that is already known, it is only added to that
//! entry's attribution set; its dependencies are not walked again. This is
//! what breaks cycles.

use pluto_schema::lockfile::Attribution;
use pluto_schema::{PackageName, ProjectManifest, ResolvedPackage, ReverseMapKey};
use std::collections::HashMap;

use crate::error::Result;
use crate::store::ManifestSource;

/// Everything reachable from a project manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// One entry per distinct key, in discovery order.
    pub real: Vec<ResolvedPackage>,
    /// The keys of `real`, same order.
    pub flat: Vec<ReverseMapKey>,
    /// Distinct package names, in discovery order. One workspace each.
    pub submodules: Vec<PackageName>,
}

impl Resolution {
    pub fn is_empty(&self) -> bool {
        self.real.is_empty()
    }
}

/// Owned state threaded through the layers.
#[derive(Default)]
struct Accumulator {
    resolution: Resolution,
    index: HashMap<ReverseMapKey, usize>,
}

impl Accumulator {
    /// Record `package` under its key, or attribute the existing entry.
    /// Returns the slot of a newly admitted package.
    fn admit(&mut self, package: ResolvedPackage, parent: Attribution) -> Option<usize> {
        if let Some(&slot) = self.index.get(&package.reverse_map_key) {
            self.resolution.real[slot].attribute(parent);
            return None;
        }

        let slot = self.resolution.real.len();
        self.index.insert(package.reverse_map_key.clone(), slot);
        self.resolution.flat.push(package.reverse_map_key.clone());
        if !self.resolution.submodules.contains(&package.name) {
            self.resolution.submodules.push(package.name.clone());
        }
        self.resolution.real.push(package);
        Some(slot)
    }

    /// Expand one layer, returning the next.
    fn expand(&mut self, layer: &[usize], source: &dyn ManifestSource) -> Result<Vec<usize>> {
        let mut next = Vec::new();

        for &slot in layer {
            let parent = &self.resolution.real[slot];
            let parent_key = parent.reverse_map_key.clone();
            let manifest = source.package_manifest(&parent.name)?;

            for (name, spec) in &manifest.dependencies {
                let attribution = Attribution::Parent(parent_key.clone());
                let child = ResolvedPackage::new(name.clone(), spec.clone(), attribution.clone());
                next.extend(self.admit(child, attribution));
            }
        }

        Ok(next)
    }
}

/// Compute the full transitive set of install targets for `project`.
///
/// Fails if any reachable package has no manifest in `source`.
pub fn resolve(project: &ProjectManifest, source: &dyn ManifestSource) -> Result<Resolution> {
    let mut acc = Accumulator::default();

    let mut frontier: Vec<usize> = project
        .dependencies
        .iter()
        .filter_map(|(name, spec)| {
            let package = ResolvedPackage::new(name.clone(), spec.clone(), Attribution::Root);
            acc.admit(package, Attribution::Root)
        })
        .collect();

    let mut depth = 0;
    while !frontier.is_empty() {
        if tracing::enabled!(tracing::Level::DEBUG) {
            let keys: Vec<&str> = frontier
                .iter()
                .map(|&slot| acc.resolution.flat[slot].as_str())
                .collect();
            tracing::debug!(depth, "Resolving layer: {}", keys.join(", "));
        }
        frontier = acc.expand(&frontier, source)?;
        depth += 1;
    }

    tracing::debug!(
        "Resolved {} targets across {} packages",
        acc.resolution.flat.len(),
        acc.resolution.submodules.len()
    );
    Ok(acc.resolution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlutoError;
    use crate::testing::{MemoryStore, commit, project, tag};
    use pluto_schema::VersionSpec;
    use std::collections::HashSet;

    fn keys(resolution: &Resolution) -> Vec<&str> {
        resolution.flat.iter().map(ReverseMapKey::as_str).collect()
    }

    fn find<'a>(resolution: &'a Resolution, key: &str) -> &'a ResolvedPackage {
        resolution
            .real
            .iter()
            .find(|p| p.reverse_map_key.as_str() == key)
            .unwrap()
    }

    fn parent(key: &str) -> Attribution {
        Attribution::Parent(ReverseMapKey::from_stored(key))
    }

    #[test]
    fn test_latest_parent_tagged_child() {
        let store = MemoryStore::new()
            .with("ui", &[("core", tag("v1.0"))])
            .with("core", &[]);
        let project = project(&[("ui", VersionSpec::Latest)]);

        let resolution = resolve(&project, &store).unwrap();

        assert_eq!(keys(&resolution), ["ui", "core@v1.0"]);
        assert_eq!(find(&resolution, "ui").installed_by, [Attribution::Root]);
        assert_eq!(find(&resolution, "core@v1.0").installed_by, [parent("ui")]);
        assert_eq!(resolution.submodules, [PackageName::new("ui"), PackageName::new("core")]);
    }

    #[test]
    fn test_shared_child_collects_every_parent_once() {
        let store = MemoryStore::new()
            .with("a", &[("c", VersionSpec::Latest)])
            .with("b", &[("c", VersionSpec::Latest)])
            .with("c", &[]);
        let project = project(&[
            ("a", VersionSpec::Latest),
            ("b", VersionSpec::Latest),
            ("c", VersionSpec::Latest),
        ]);

        let resolution = resolve(&project, &store).unwrap();

        assert_eq!(resolution.flat.len(), 3);
        let c = find(&resolution, "c");
        assert_eq!(c.installed_by, [Attribution::Root, parent("a"), parent("b")]);
    }

    #[test]
    fn test_cycle_terminates() {
        let store = MemoryStore::new()
            .with("a", &[("b", VersionSpec::Latest)])
            .with("b", &[("a", VersionSpec::Latest)]);
        let project = project(&[("a", VersionSpec::Latest)]);

        let resolution = resolve(&project, &store).unwrap();

        assert_eq!(keys(&resolution), ["a", "b"]);
        assert_eq!(find(&resolution, "a").installed_by, [Attribution::Root, parent("b")]);
        assert_eq!(find(&resolution, "b").installed_by, [parent("a")]);
    }

    #[test]
    fn test_conflicting_pins_coexist() {
        let store = MemoryStore::new()
            .with("a", &[("core", tag("v1"))])
            .with("b", &[("core", commit("abc123"))])
            .with("core", &[]);
        let project = project(&[("a", VersionSpec::Latest), ("b", VersionSpec::Latest)]);

        let resolution = resolve(&project, &store).unwrap();

        assert_eq!(keys(&resolution), ["a", "b", "core@v1", "core#abc123"]);
        assert_eq!(resolution.submodules.len(), 3);
    }

    #[test]
    fn test_layers_follow_declared_order() {
        let store = MemoryStore::new()
            .with("zeta", &[("yak", VersionSpec::Latest), ("bee", VersionSpec::Latest)])
            .with("alpha", &[])
            .with("yak", &[])
            .with("bee", &[]);
        let project: ProjectManifest = serde_json::from_str(
            r#"{ "dependencies": { "zeta": { "latest": true }, "alpha": { "latest": true } } }"#,
        )
        .unwrap();

        let resolution = resolve(&project, &store).unwrap();

        assert_eq!(keys(&resolution), ["zeta", "alpha", "yak", "bee"]);
    }

    #[test]
    fn test_missing_manifest_fails() {
        let store = MemoryStore::new().with("ui", &[("ghost", VersionSpec::Latest)]);
        let project = project(&[("ui", VersionSpec::Latest)]);

        let err = resolve(&project, &store).unwrap_err();
        assert!(matches!(err, PlutoError::PackageNotAvailable(name) if name == "ghost"));
    }

    #[test]
    fn test_empty_project() {
        let resolution = resolve(&project(&[]), &MemoryStore::new()).unwrap();
        assert!(resolution.is_empty());
    }

    /// Generated layered DAGs: every reachable key appears once, and each
    /// entry's attribution is exactly its set of distinct declaring parents.
    #[test]
    fn test_generated_graphs_attribute_exactly() {
        let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
        let mut next = move || {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            seed
        };

        for _ in 0..25 {
            let size = 3 + (next() % 12) as usize;
            let mut store = MemoryStore::new();
            let mut declared: HashMap<String, HashSet<String>> = HashMap::new();

            for i in 0..size {
                let deps: Vec<(String, VersionSpec)> = (i + 1..size)
                    .filter(|_| next() % 3 == 0)
                    .map(|j| (format!("p{j}"), VersionSpec::Latest))
                    .collect();
                for (dep, _) in &deps {
                    declared.entry(dep.clone()).or_default().insert(format!("p{i}"));
                }
                let deps: Vec<(&str, VersionSpec)> =
                    deps.iter().map(|(n, s)| (n.as_str(), s.clone())).collect();
                store = store.with(&format!("p{i}"), &deps);
            }

            let resolution = resolve(&project(&[("p0", VersionSpec::Latest)]), &store).unwrap();

            let unique: HashSet<_> = resolution.flat.iter().collect();
            assert_eq!(unique.len(), resolution.flat.len());

            let reached: HashSet<&str> = keys(&resolution).into_iter().collect();
            for package in &resolution.real {
                let expected: HashSet<String> = declared
                    .get(package.name.as_str())
                    .into_iter()
                    .flatten()
                    .filter(|p| reached.contains(p.as_str()))
                    .cloned()
                    .collect();
                let actual: HashSet<String> = package
                    .installed_by
                    .iter()
                    .filter(|a| **a != Attribution::Root)
                    .map(ToString::to_string)
                    .collect();
                assert_eq!(actual.len(), package.installed_by.len() - usize::from(package.is_direct()));
                assert_eq!(actual, expected, "attribution of {}", package.name);
            }
        }
    }
}
