//! Error taxonomy for the engine.
//!
//! A compatibility mismatch is not an error (see `CompatReport`) and a
//! missing lockfile is `None`, not a failure.

use pluto_schema::{PackageName, SchemaError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlutoError {
    #[error("Manifest not found: {}", .0.display())]
    ManifestNotFound(PathBuf),

    #[error("Package '{0}' is not in the registry (try `pluto fetch`)")]
    PackageNotAvailable(PackageName),

    #[error("Metadata cache missing at {} (run `pluto fetch` first)", .0.display())]
    MetadataMissing(PathBuf),

    #[error("'{0}' is not a dependency of this project")]
    DependencyNotFound(PackageName),

    #[error("No version of '{name}' matches '{requested}'{}", format_available(.available))]
    VersionNotFound {
        name: PackageName,
        requested: String,
        available: Vec<String>,
    },

    #[error("'{0}' is not installed")]
    NotInstalled(String),

    #[error(transparent)]
    InvalidVersionSpec(#[from] SchemaError),

    #[error("git {command} failed: {stderr}")]
    Vcs { command: String, stderr: String },

    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Install task panicked: {0}")]
    Join(#[from] tokio::task::JoinError),
}

fn format_available(available: &[String]) -> String {
    const SHOWN: usize = 10;
    if available.is_empty() {
        return String::new();
    }
    let mut out = format!(" (available: {}", available[..available.len().min(SHOWN)].join(", "));
    if available.len() > SHOWN {
        out.push_str(&format!(", and {} more", available.len() - SHOWN));
    }
    out.push(')');
    out
}

impl PlutoError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = PlutoError> = std::result::Result<T, E>;

/// Attach a path to bare `io::Result`s.
pub(crate) trait IoContext<T> {
    fn at(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn at(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| PlutoError::io(path, e))
    }
}
