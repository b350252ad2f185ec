//! Exclusive access to per-package VCS workspaces.
//!
//! A workspace has exactly one checked-out state, so every operation on it
//! happens under a [`WorkspaceLease`]. The lease remembers the default
//! branch it found and puts the workspace back there when it ends, on the
//! error path too.

use pluto_schema::{PackageName, VersionSpec};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::OwnedMutexGuard;

use crate::error::Result;
use crate::vcs::{GitRef, Vcs};

/// One async lock per package workspace.
#[derive(Debug, Default)]
pub struct WorkspacePool {
    locks: Mutex<HashMap<PackageName, Arc<tokio::sync::Mutex<()>>>>,
}

impl WorkspacePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `name`'s workspace.
    pub async fn acquire(&self, name: &PackageName) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self
                .locks
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            Arc::clone(locks.entry(name.clone()).or_default())
        };
        lock.lock_owned().await
    }
}

/// A checked-out workspace held exclusively until released.
pub struct WorkspaceLease {
    _guard: OwnedMutexGuard<()>,
    path: PathBuf,
    vcs: Arc<dyn Vcs>,
    default_branch: String,
    released: bool,
}

impl WorkspaceLease {
    /// Take over the workspace at `path` and record its default branch.
    pub fn open(guard: OwnedMutexGuard<()>, path: PathBuf, vcs: Arc<dyn Vcs>) -> Result<Self> {
        let default_branch = vcs.default_branch(&path)?;
        tracing::debug!("Workspace {} on branch {default_branch}", path.display());
        Ok(Self {
            _guard: guard,
            path,
            vcs,
            default_branch,
            released: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn default_branch(&self) -> &str {
        &self.default_branch
    }

    /// Fetch from the remote so a `Latest` checkout sees its current tip.
    ///
    /// A failed fetch is not fatal: the remote-tracking refs left by the
    /// registry's submodule update are used instead.
    pub fn refresh(&self) {
        if let Err(e) = self.vcs.fetch(&self.path) {
            tracing::warn!("Could not fetch {}: {e}", self.path.display());
        }
    }

    /// Move the workspace to `spec` and return the revision now checked out.
    pub fn checkout(&self, spec: &VersionSpec) -> Result<String> {
        let target = GitRef::for_spec(spec, &self.default_branch);
        self.vcs.checkout(&self.path, &target)?;
        self.vcs.head_commit(&self.path)
    }

    /// Restore the default branch and give the workspace back.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        self.restore()
    }

    fn restore(&self) -> Result<()> {
        self.vcs
            .checkout(&self.path, &GitRef::Branch(self.default_branch.clone()))
    }
}

impl Drop for WorkspaceLease {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = self.restore() {
            tracing::warn!(
                "Failed to restore {} to {}: {e}",
                self.path.display(),
                self.default_branch
            );
        }
    }
}
