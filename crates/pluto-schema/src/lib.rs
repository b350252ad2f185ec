//! Shared data model and on-disk wire formats for pluto.
//!
//! Everything that crosses a file boundary lives here: the project
//! manifest (`module.json`), the remote package manifest, the lockfile
//! (`pluto.lock`) and the local mapping cache (`moduleMap.json`), together
//! with the identity types they are built from.

pub mod compat;
pub mod lockfile;
pub mod manifest;
pub mod mapping;
pub mod types;
pub mod version;

// Re-exports
pub use compat::CompatReport;
pub use lockfile::{LockFile, ResolvedPackage};
pub use manifest::{Author, PackageManifest, ProjectManifest};
pub use mapping::ModuleMapping;
pub use types::*;
pub use version::{PackageRef, ReverseMapKey, VersionSpec};

/// Characters that may not appear in a package name because they delimit
/// the version part of a [`ReverseMapKey`].
pub const FORBIDDEN_NAME_CHARS: [char; 2] = ['@', '#'];
