//! Filesystem helpers shared by the cache, install and removal paths.
//!
//! Everything here is blocking; async callers go through `spawn_blocking`.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use crate::error::{IoContext, PlutoError, Result};

/// Version-control metadata never copied out of a workspace.
pub const VCS_DIR: &str = ".git";

/// Recursively copy `src` into `dst`, skipping any entry named `.git`.
///
/// `dst` is created if needed. Symlinks are copied as the files they point at.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<u64> {
    let mut copied = 0;
    fs::create_dir_all(dst).at(dst)?;

    let walker = WalkDir::new(src)
        .min_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| e.file_name() != VCS_DIR);

    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(src).to_path_buf();
            PlutoError::io(path, e.into())
        })?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| PlutoError::io(entry.path(), std::io::Error::other(e)))?;
        let target = dst.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).at(&target)?;
        } else {
            copied += fs::copy(entry.path(), &target).at(entry.path())?;
        }
    }

    Ok(copied)
}

/// Remove a file or directory tree. Absence is not an error.
pub fn remove_all(path: &Path) -> Result<bool> {
    let result = match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => Err(e),
    };
    result.at(path)?;
    Ok(true)
}

pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).at(path)
}

/// Read and parse a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).at(path)?;
    parse_json(path, &content)
}

pub(crate) fn parse_json<T: DeserializeOwned>(path: &Path, content: &str) -> Result<T> {
    serde_json::from_str(content).map_err(|source| PlutoError::Json {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn encode_json<T: Serialize>(path: &Path, value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|source| PlutoError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Atomically write `value` as pretty JSON.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    write_atomic(path, &encode_json(path, value)?)
}

/// Write `<file>.tmp`, then rename it over `path`.
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let tmp = tmp_path(path);
    fs::write(&tmp, content).at(&tmp)?;
    fs::rename(&tmp, path).at(path)
}

pub(crate) fn tmp_path(path: &Path) -> std::path::PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
