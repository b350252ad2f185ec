//! A project directory: its manifest and, if present, its lockfile.

use pluto_schema::{LockFile, ProjectManifest};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::{IoContext, PlutoError, Result};
use crate::fsutil;
use crate::paths::ProjectLayout;

#[derive(Debug, Clone)]
pub struct Project {
    pub layout: ProjectLayout,
    pub manifest: ProjectManifest,
    /// `None` means nothing has been installed yet.
    pub lock: Option<LockFile>,
}

impl Project {
    /// Load `module.json` and `pluto.lock` from `root`.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let layout = ProjectLayout::new(root);

        let manifest_path = layout.manifest();
        if !fs::try_exists(&manifest_path).await.unwrap_or(false) {
            return Err(PlutoError::ManifestNotFound(manifest_path));
        }
        let manifest = load_json(&manifest_path).await?;

        let lock_path = layout.lockfile();
        let lock = if fs::try_exists(&lock_path).await.unwrap_or(false) {
            Some(load_json(&lock_path).await?)
        } else {
            tracing::debug!("No lockfile at {}, assuming fresh install", lock_path.display());
            None
        };

        Ok(Self {
            layout,
            manifest,
            lock,
        })
    }

    pub async fn save_manifest(&self) -> Result<()> {
        save_json(&self.layout.manifest(), &self.manifest).await
    }

    /// Write the lock if there is one.
    pub async fn save_lock(&self) -> Result<()> {
        match &self.lock {
            Some(lock) => save_json(&self.layout.lockfile(), lock).await,
            None => Ok(()),
        }
    }
}

async fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).await.at(path)?;
    fsutil::parse_json(path, &content)
}

async fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = fsutil::encode_json(path, value)?;
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || fsutil::write_atomic(&path, &content)).await?
}

#[cfg(test)]
mod tests {
    use super::*;
    use pluto_schema::{PackageName, VersionSpec};

    #[tokio::test]
    async fn test_open_without_lock() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("module.json"),
            r#"{ "name": "game", "runtime": "Lua5.1", "frameworks": ["love11"], "dependencies": {} }"#,
        )
        .unwrap();

        let mut project = Project::open(tmp.path()).await.unwrap();
        assert!(project.lock.is_none());
        assert_eq!(project.manifest.runtime, "Lua5.1");

        project
            .manifest
            .pin(PackageName::new("ui"), VersionSpec::Latest);
        project.save_manifest().await.unwrap();
        project.save_lock().await.unwrap();
        assert!(!tmp.path().join("pluto.lock").exists());
        assert!(!tmp.path().join("module.json.tmp").exists());

        let reopened = Project::open(tmp.path()).await.unwrap();
        assert_eq!(reopened.manifest.dependencies.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_manifest() {
        let tmp = tempfile::tempdir().unwrap();
        let err = Project::open(tmp.path()).await.unwrap_err();
        assert!(matches!(err, PlutoError::ManifestNotFound(_)));
    }
}
