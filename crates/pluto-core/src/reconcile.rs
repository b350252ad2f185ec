//! Diffing a fresh resolution against the previous lockfile, and folding
//! installed targets back into it.
//!
//! Entries already present in the lock are left exactly as they are. In
//! particular their attribution is never extended by a later resolution;
//! only an explicit removal prunes the lock.

use pluto_schema::{LockFile, PackageName, ResolvedPackage, ReverseMapKey};

use crate::resolver::Resolution;

/// The part of a resolution that still has to be installed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delta {
    pub flat: Vec<ReverseMapKey>,
    pub real: Vec<ResolvedPackage>,
    /// Names with at least one new target, in resolution order.
    pub submodules: Vec<PackageName>,
}

impl Delta {
    pub fn is_empty(&self) -> bool {
        self.flat.is_empty() && self.real.is_empty()
    }
}

/// New-only subset of `resolved`. Without a previous lock everything is new.
pub fn diff(resolved: &Resolution, previous: Option<&LockFile>) -> Delta {
    let Some(lock) = previous else {
        return Delta {
            flat: resolved.flat.clone(),
            real: resolved.real.clone(),
            submodules: resolved.submodules.clone(),
        };
    };

    let flat = resolved
        .flat
        .iter()
        .filter(|key| !lock.contains(key))
        .cloned()
        .collect();
    let real: Vec<ResolvedPackage> = resolved
        .real
        .iter()
        .filter(|p| lock.find(&p.reverse_map_key).is_none())
        .cloned()
        .collect();
    let submodules = resolved
        .submodules
        .iter()
        .filter(|name| real.iter().any(|p| &p.name == *name))
        .cloned()
        .collect();

    Delta {
        flat,
        real,
        submodules,
    }
}

/// Fold installed targets into `previous`. Applying the same delta twice
/// yields the same lock as applying it once.
pub fn merge(previous: Option<&LockFile>, delta: &Delta) -> LockFile {
    let mut lock = previous.cloned().unwrap_or_default();

    for key in &delta.flat {
        if !lock.contains(key) {
            lock.flat_package_list.push(key.clone());
        }
    }
    for package in &delta.real {
        if lock.find(&package.reverse_map_key).is_none() {
            lock.real_package_list.push(package.clone());
        }
    }

    lock
}
