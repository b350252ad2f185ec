//! Version pins and the canonical identity derived from them.
//!
//! A dependency is pinned to exactly one of three things: the tip of the
//! default branch, a tag, or a commit prefix. On disk this is the object
//! `{ "latest": true }`, `{ "gitTag": "v1.0" }` or `{ "gitCommit": "1a2b" }`;
//! in memory it is the [`VersionSpec`] sum type.
//!
//! Every `(name, spec)` pair has a [`ReverseMapKey`]: `name`, `name@tag` or
//! `name#commit`. The key is an identity for lookup and display only. Code
//! never recovers the pin by taking the key apart.

use serde::{Deserialize, Serialize};

use crate::types::{PackageName, SchemaError};

/// What a dependency is pinned to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "VersionSpecWire", into = "VersionSpecWire")]
pub enum VersionSpec {
    /// Track the tip of the package's default branch.
    Latest,
    /// A named tag.
    Tag(String),
    /// A prefix of a full commit hash.
    Commit(String),
}

impl VersionSpec {
    /// Returns `true` for [`VersionSpec::Latest`].
    pub fn is_latest(&self) -> bool {
        matches!(self, Self::Latest)
    }

    /// Short human label: `latest`, `@tag` or `#commit`.
    pub fn label(&self) -> String {
        match self {
            Self::Latest => "latest".to_string(),
            Self::Tag(tag) => format!("@{tag}"),
            Self::Commit(commit) => format!("#{commit}"),
        }
    }
}

impl std::fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}

/// JSON shape of a version pin. Unknown keys are ignored here; a project
/// manifest reads `installedCommit` next to the pin itself.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VersionSpecWire {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    latest: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    git_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    git_commit: Option<String>,
}

impl TryFrom<VersionSpecWire> for VersionSpec {
    type Error = SchemaError;

    fn try_from(wire: VersionSpecWire) -> Result<Self, Self::Error> {
        match (wire.latest, wire.git_tag, wire.git_commit) {
            (true, None, None) => Ok(Self::Latest),
            (false, Some(tag), None) if !tag.is_empty() => Ok(Self::Tag(tag)),
            (false, None, Some(commit)) if !commit.is_empty() => Ok(Self::Commit(commit)),
            (false, None, None) => Err(SchemaError::InvalidVersionSpec(
                "one of latest, gitTag, gitCommit must be set".to_string(),
            )),
            _ => Err(SchemaError::InvalidVersionSpec(
                "exactly one of latest, gitTag, gitCommit may be set".to_string(),
            )),
        }
    }
}

impl From<VersionSpec> for VersionSpecWire {
    fn from(spec: VersionSpec) -> Self {
        match spec {
            VersionSpec::Latest => Self {
                latest: true,
                ..Self::default()
            },
            VersionSpec::Tag(tag) => Self {
                git_tag: Some(tag),
                ..Self::default()
            },
            VersionSpec::Commit(commit) => Self {
                git_commit: Some(commit),
                ..Self::default()
            },
        }
    }
}

/// Canonical identity of a `(package, version)` pair.
///
/// Used as the deduplication key for resolution, the lockfile and the
/// project's module directory. Two specs of the same package produce two
/// different keys and are installed side by side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReverseMapKey(String);

impl ReverseMapKey {
    /// Derive the key for `name` pinned at `spec`.
    pub fn new(name: &PackageName, spec: &VersionSpec) -> Self {
        match spec {
            VersionSpec::Latest => Self(name.to_string()),
            VersionSpec::Tag(tag) => Self(format!("{name}@{tag}")),
            VersionSpec::Commit(commit) => Self(format!("{name}#{commit}")),
        }
    }

    /// Wrap a key read back from persisted state.
    pub fn from_stored(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Return the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ReverseMapKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ReverseMapKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl AsRef<std::path::Path> for ReverseMapKey {
    fn as_ref(&self) -> &std::path::Path {
        std::path::Path::new(&self.0)
    }
}

/// A package reference typed by a user: `name`, `name@tag` or `name#commit`.
///
/// # Example
///
/// ```
/// use pluto_schema::{PackageRef, VersionSpec};
///
/// let r: PackageRef = "core@v1.0".parse().unwrap();
/// assert_eq!(r.name, "core");
/// assert_eq!(r.spec, VersionSpec::Tag("v1.0".into()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRef {
    /// The package being referred to.
    pub name: PackageName,
    /// The pin parsed from the suffix; `Latest` when there is none.
    pub spec: VersionSpec,
}

impl PackageRef {
    /// The identity this reference resolves to.
    pub fn key(&self) -> ReverseMapKey {
        ReverseMapKey::new(&self.name, &self.spec)
    }
}

impl std::str::FromStr for PackageRef {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (name, spec) = if let Some((name, tag)) = s.split_once('@') {
            (name, VersionSpec::Tag(tag.to_string()))
        } else if let Some((name, commit)) = s.split_once('#') {
            (name, VersionSpec::Commit(commit.to_string()))
        } else {
            (s, VersionSpec::Latest)
        };

        if matches!(&spec, VersionSpec::Tag(v) | VersionSpec::Commit(v) if v.is_empty()) {
            return Err(SchemaError::InvalidVersionSpec(format!(
                "missing version after delimiter in '{s}'"
            )));
        }

        Ok(Self {
            name: PackageName::parse(name)?,
            spec,
        })
    }
}
