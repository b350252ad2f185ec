//! In-memory collaborators for engine tests.

use pluto_schema::{PackageManifest, PackageName, ProjectManifest, VersionSpec};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::{PlutoError, Result};
use crate::store::ManifestSource;
use crate::vcs::{GitRef, Vcs};

pub(crate) fn tag(t: &str) -> VersionSpec {
    VersionSpec::Tag(t.to_string())
}

pub(crate) fn commit(c: &str) -> VersionSpec {
    VersionSpec::Commit(c.to_string())
}

pub(crate) fn project(deps: &[(&str, VersionSpec)]) -> ProjectManifest {
    ProjectManifest {
        name: "test-project".into(),
        runtime: "Lua5.4".into(),
        dependencies: deps
            .iter()
            .map(|(n, s)| (PackageName::new(n), s.clone()))
            .collect(),
        ..ProjectManifest::default()
    }
}

/// Manifests keyed by name, no filesystem involved.
#[derive(Debug, Default)]
pub(crate) struct MemoryStore {
    manifests: HashMap<PackageName, Arc<PackageManifest>>,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with(mut self, name: &str, deps: &[(&str, VersionSpec)]) -> Self {
        let manifest = PackageManifest {
            name: PackageName::new(name),
            runtime: "*".into(),
            frameworks: vec!["*".into()],
            dependencies: deps
                .iter()
                .map(|(n, s)| (PackageName::new(n), s.clone()))
                .collect(),
            ..PackageManifest::default()
        };
        self.manifests
            .insert(PackageName::new(name), Arc::new(manifest));
        self
    }
}

impl ManifestSource for MemoryStore {
    fn package_manifest(&self, name: &PackageName) -> Result<Arc<PackageManifest>> {
        self.manifests
            .get(name)
            .cloned()
            .ok_or_else(|| PlutoError::PackageNotAvailable(name.clone()))
    }
}

#[derive(Debug, Default)]
struct RepoState {
    head: String,
    on_branch: bool,
    /// Where each local branch points; unset branches sit at their initial
    /// revision.
    local_branches: HashMap<String, String>,
    checkouts: Vec<String>,
    fetches: usize,
}

/// A scripted [`Vcs`].
///
/// Checking out writes a `VERSION` file into the workspace so copies can be
/// told apart, and revisions are derived from the ref name. Local branches
/// only move when the remote tip is checked out over them.
#[derive(Debug, Default)]
pub(crate) struct FakeVcs {
    repos: Mutex<HashMap<PathBuf, RepoState>>,
    remote_heads: Mutex<HashMap<String, String>>,
    failing: Mutex<HashSet<String>>,
    submodule_updates: Mutex<Vec<PathBuf>>,
    clones: Mutex<Vec<String>>,
    pulls: Mutex<usize>,
}

impl FakeVcs {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn revision_for(checkout_arg: &str) -> String {
        format!("rev-{}", checkout_arg.replace('/', "-"))
    }

    /// Create a workspace sitting on `branch`.
    pub(crate) fn seed_workspace(&self, path: &Path, branch: &str) {
        fs::create_dir_all(path.join(".git")).unwrap();
        fs::write(path.join("init.lua"), "return {}").unwrap();
        self.repos.lock().unwrap().insert(
            path.to_path_buf(),
            RepoState {
                head: branch.to_string(),
                on_branch: true,
                ..RepoState::default()
            },
        );
    }

    /// Move the remote's `branch` to `revision`.
    pub(crate) fn advance_branch(&self, branch: &str, revision: &str) {
        self.remote_heads
            .lock()
            .unwrap()
            .insert(branch.to_string(), revision.to_string());
    }

    pub(crate) fn fail_on(&self, checkout_arg: &str) {
        self.failing.lock().unwrap().insert(checkout_arg.to_string());
    }

    pub(crate) fn checked_out(&self, repo: &Path) -> String {
        self.repos.lock().unwrap()[repo].head.clone()
    }

    pub(crate) fn checkouts(&self, repo: &Path) -> Vec<String> {
        self.repos.lock().unwrap()[repo].checkouts.clone()
    }

    pub(crate) fn fetches(&self, repo: &Path) -> usize {
        self.repos.lock().unwrap().get(repo).map_or(0, |r| r.fetches)
    }

    pub(crate) fn submodule_updates(&self) -> Vec<PathBuf> {
        self.submodule_updates.lock().unwrap().clone()
    }

    pub(crate) fn clones(&self) -> Vec<String> {
        self.clones.lock().unwrap().clone()
    }

    pub(crate) fn pulls(&self) -> usize {
        *self.pulls.lock().unwrap()
    }

    fn remote_head(&self, branch: &str) -> String {
        self.remote_heads
            .lock()
            .unwrap()
            .get(branch)
            .cloned()
            .unwrap_or_else(|| Self::revision_for(branch))
    }
}

impl Vcs for FakeVcs {
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<()> {
        fs::create_dir_all(dest.join(".git")).unwrap();
        self.clones.lock().unwrap().push(url.to_string());
        Ok(())
    }

    fn fetch(&self, repo: &Path) -> Result<()> {
        let mut repos = self.repos.lock().unwrap();
        repos.entry(repo.to_path_buf()).or_default().fetches += 1;
        Ok(())
    }

    fn pull(&self, _repo: &Path) -> Result<()> {
        *self.pulls.lock().unwrap() += 1;
        Ok(())
    }

    fn checkout(&self, repo: &Path, target: &GitRef) -> Result<()> {
        let arg = target.checkout_arg();
        if self.failing.lock().unwrap().contains(&arg) {
            return Err(PlutoError::Vcs {
                command: format!("checkout -f {arg}"),
                stderr: format!("error: pathspec '{arg}' did not match"),
            });
        }
        let tip = match target {
            GitRef::Upstream(branch) => Some(self.remote_head(branch)),
            _ => None,
        };

        let mut repos = self.repos.lock().unwrap();
        let state = repos.entry(repo.to_path_buf()).or_default();
        match target {
            GitRef::Branch(branch) | GitRef::Upstream(branch) => {
                state.head.clone_from(branch);
                state.on_branch = true;
            }
            GitRef::Tag(_) | GitRef::Commit(_) => {
                state.head.clone_from(&arg);
                state.on_branch = false;
            }
        }
        if let Some(tip) = tip {
            state.local_branches.insert(state.head.clone(), tip);
        }
        state.checkouts.push(arg);
        let head = state.head.clone();
        drop(repos);

        fs::write(repo.join("VERSION"), head).unwrap();
        Ok(())
    }

    fn head_commit(&self, repo: &Path) -> Result<String> {
        let repos = self.repos.lock().unwrap();
        let state = &repos[repo];
        let local = state.on_branch.then(|| state.local_branches.get(&state.head)).flatten();
        Ok(local
            .cloned()
            .unwrap_or_else(|| Self::revision_for(&state.head)))
    }

    fn current_branch(&self, repo: &Path) -> Result<String> {
        let repos = self.repos.lock().unwrap();
        let state = &repos[repo];
        Ok(if state.on_branch {
            state.head.clone()
        } else {
            "HEAD".to_string()
        })
    }

    fn update_submodule(&self, repo: &Path, path: &Path) -> Result<()> {
        let full = repo.join(path);
        self.submodule_updates.lock().unwrap().push(path.to_path_buf());
        if !self.repos.lock().unwrap().contains_key(&full) {
            self.seed_workspace(&full, "main");
        }
        Ok(())
    }
}
