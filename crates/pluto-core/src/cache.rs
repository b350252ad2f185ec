//! Machine-wide module cache.
//!
//! One frozen file tree per slot, shared by every project. A slot is
//! written exactly once: it is assembled in `.staging/` and renamed into
//! place, so any slot that exists is complete. Readers only ever copy out.

use pluto_schema::{ResolvedPackage, ReverseMapKey, VersionSpec};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::error::{IoContext, Result};
use crate::fsutil;

const STAGING_DIR: &str = ".staging";

/// Staging leftovers older than this belong to an interrupted run.
pub const STALE_STAGING: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone)]
pub struct ModuleCache {
    root: PathBuf,
}

impl ModuleCache {
    /// Open (creating if needed) the cache at `root` and clear out stale
    /// staging directories.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let cache = Self { root: root.into() };
        fsutil::ensure_dir(&cache.staging_dir())?;
        let purged = cache.purge_staging(STALE_STAGING)?;
        if purged > 0 {
            tracing::info!("Purged {purged} interrupted cache writes");
        }
        Ok(cache)
    }

    /// Key of the slot holding `package` at `revision`.
    ///
    /// Tag and commit pins use their own key. `Latest` is pinned to the
    /// revision it resolved to, so the slot stays valid after the default
    /// branch moves on.
    pub fn slot_key(package: &ResolvedPackage, revision: &str) -> ReverseMapKey {
        match package.version {
            VersionSpec::Latest => {
                ReverseMapKey::new(&package.name, &VersionSpec::Commit(revision.to_string()))
            }
            _ => package.reverse_map_key.clone(),
        }
    }

    pub fn slot(&self, key: &ReverseMapKey) -> PathBuf {
        self.root.join(key)
    }

    pub fn contains(&self, key: &ReverseMapKey) -> bool {
        self.slot(key).is_dir()
    }

    /// Snapshot `src` (minus VCS metadata) into the slot for `key`.
    ///
    /// Returns `false` without touching anything if the slot already exists.
    pub fn populate(&self, key: &ReverseMapKey, src: &Path) -> Result<bool> {
        let slot = self.slot(key);
        if slot.is_dir() {
            return Ok(false);
        }

        let staging_root = self.staging_dir();
        let staging = tempfile::Builder::new()
            .prefix("slot-")
            .tempdir_in(&staging_root)
            .at(&staging_root)?;
        let bytes = fsutil::copy_tree(src, staging.path())?;

        if let Err(e) = fs::rename(staging.path(), &slot) {
            // Someone else published the slot first.
            if slot.is_dir() {
                return Ok(false);
            }
            return Err(crate::error::PlutoError::io(&slot, e));
        }

        tracing::debug!("Cached {key} ({bytes} bytes)");
        Ok(true)
    }

    /// Replace `dest` with a copy of the slot for `key`.
    pub fn materialize(&self, key: &ReverseMapKey, dest: &Path) -> Result<()> {
        fsutil::remove_all(dest)?;
        fsutil::copy_tree(&self.slot(key), dest)?;
        Ok(())
    }

    /// Remove staging entries last modified more than `older_than` ago.
    pub fn purge_staging(&self, older_than: Duration) -> Result<usize> {
        let staging = self.staging_dir();
        let now = SystemTime::now();
        let mut purged = 0;

        for entry in fs::read_dir(&staging).at(&staging)? {
            let entry = entry.at(&staging)?;
            let age = entry
                .metadata()
                .and_then(|m| m.modified())
                .ok()
                .and_then(|modified| now.duration_since(modified).ok())
                .unwrap_or_default();
            if age >= older_than && fsutil::remove_all(&entry.path())? {
                purged += 1;
            }
        }

        Ok(purged)
    }

    fn staging_dir(&self) -> PathBuf {
        self.root.join(STAGING_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pluto_schema::PackageName;
    use pluto_schema::lockfile::Attribution;
    use tempfile::tempdir;

    fn source_tree(root: &Path, body: &str) -> PathBuf {
        let src = root.join("workspace");
        fs::create_dir_all(src.join(".git")).unwrap();
        fs::write(src.join(".git/HEAD"), "ref: refs/heads/main").unwrap();
        fs::write(src.join("init.lua"), body).unwrap();
        src
    }

    #[test]
    fn test_populate_once_then_hit() {
        let tmp = tempdir().unwrap();
        let cache = ModuleCache::open(tmp.path().join("cache")).unwrap();
        let src = source_tree(tmp.path(), "v1");
        let key = ReverseMapKey::from_stored("ui@v1.0");

        assert!(!cache.contains(&key));
        assert!(cache.populate(&key, &src).unwrap());
        assert!(cache.contains(&key));
        assert!(!cache.slot(&key).join(".git").exists());

        // A second write leaves the first snapshot alone.
        fs::write(src.join("init.lua"), "v2").unwrap();
        assert!(!cache.populate(&key, &src).unwrap());
        assert_eq!(fs::read_to_string(cache.slot(&key).join("init.lua")).unwrap(), "v1");

        let staged = fs::read_dir(tmp.path().join("cache/.staging")).unwrap().count();
        assert_eq!(staged, 0);
    }

    #[test]
    fn test_materialize_replaces_destination() {
        let tmp = tempdir().unwrap();
        let cache = ModuleCache::open(tmp.path().join("cache")).unwrap();
        let src = source_tree(tmp.path(), "fresh");
        let key = ReverseMapKey::from_stored("ui");
        cache.populate(&key, &src).unwrap();

        let dest = tmp.path().join("project/pluto_modules/ui");
        fs::create_dir_all(&dest).unwrap();
        fs::write(dest.join("stale.lua"), "old").unwrap();

        cache.materialize(&key, &dest).unwrap();
        assert!(!dest.join("stale.lua").exists());
        assert_eq!(fs::read_to_string(dest.join("init.lua")).unwrap(), "fresh");
    }

    #[test]
    fn test_interrupted_staging_is_purged() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().join("cache");
        let cache = ModuleCache::open(&root).unwrap();

        fs::create_dir_all(root.join(".staging/slot-abandoned/lib")).unwrap();
        assert_eq!(cache.purge_staging(Duration::from_secs(3600)).unwrap(), 0);
        assert_eq!(cache.purge_staging(Duration::ZERO).unwrap(), 1);
        assert!(!root.join(".staging/slot-abandoned").exists());
    }

    #[test]
    fn test_latest_slot_is_pinned_to_revision() {
        let ui = ResolvedPackage::new(PackageName::new("ui"), VersionSpec::Latest, Attribution::Root);
        assert_eq!(ModuleCache::slot_key(&ui, "abc123").as_str(), "ui#abc123");

        let core = ResolvedPackage::new(
            PackageName::new("core"),
            VersionSpec::Tag("v1.0".into()),
            Attribution::Root,
        );
        assert_eq!(ModuleCache::slot_key(&core, "abc123").as_str(), "core@v1.0");
    }
}
