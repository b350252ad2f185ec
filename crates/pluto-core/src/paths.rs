use pluto_schema::ReverseMapKey;
use std::path::{Path, PathBuf};

/// Project manifest file name.
pub const PROJECT_MANIFEST: &str = "module.json";
/// Lockfile name.
pub const LOCKFILE: &str = "pluto.lock";
/// Directory packages are materialized into inside a project.
pub const MODULES_DIR: &str = "pluto_modules";
/// Registry-side manifest inside each package folder.
pub const PACKAGE_MANIFEST: &str = "manifest.json";

/// Machine-local directories under `PLUTO_HOME`.
#[derive(Debug, Clone)]
pub struct HomeLayout {
    root: PathBuf,
}

impl HomeLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Registry clone: ~/.pluto/metadata
    pub fn metadata_dir(&self) -> PathBuf {
        self.root.join("metadata")
    }

    /// Package folders inside the registry clone.
    pub fn packages_dir(&self) -> PathBuf {
        self.metadata_dir().join("packages")
    }

    /// Registry-side manifest of the package stored in `folder`.
    pub fn package_manifest(&self, folder: &str) -> PathBuf {
        self.packages_dir().join(folder).join(PACKAGE_MANIFEST)
    }

    /// VCS workspace of the package stored in `folder`.
    pub fn workspace(&self, folder: &str) -> PathBuf {
        self.packages_dir().join(folder).join("module")
    }

    /// Workspace path relative to the registry clone, for submodule commands.
    pub fn workspace_relative(folder: &str) -> PathBuf {
        Path::new("packages").join(folder).join("module")
    }

    /// Module cache: ~/.pluto/module-cache
    pub fn cache_dir(&self) -> PathBuf {
        self.root.join("module-cache")
    }

    /// Mapping cache: ~/.pluto/moduleMap.json
    pub fn mapping_file(&self) -> PathBuf {
        self.root.join("moduleMap.json")
    }
}

/// Files owned by a single project directory.
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest(&self) -> PathBuf {
        self.root.join(PROJECT_MANIFEST)
    }

    pub fn lockfile(&self) -> PathBuf {
        self.root.join(LOCKFILE)
    }

    pub fn modules_dir(&self) -> PathBuf {
        self.root.join(MODULES_DIR)
    }

    /// Install directory for one target: bare name for latest, else `name@tag` / `name#commit`.
    pub fn install_dir(&self, key: &ReverseMapKey) -> PathBuf {
        self.modules_dir().join(key)
    }
}
