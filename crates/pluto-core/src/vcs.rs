//! The version-control contract the engine needs, and a `git` CLI client.
//!
//! The engine never shells out directly; it talks to a [`Vcs`]. Tests
//! substitute a scripted implementation.

use pluto_schema::VersionSpec;
use std::path::Path;
use std::process::Command;

use crate::error::{PlutoError, Result};

/// Remote every workspace tracks.
pub const REMOTE: &str = "origin";

/// A ref to check out on a workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitRef {
    /// The local branch as it is.
    Branch(String),
    /// The remote's tip of a branch. The local branch is reset onto it.
    Upstream(String),
    Tag(String),
    Commit(String),
}

impl GitRef {
    /// The ref a pin resolves to, given the workspace's default branch.
    pub fn for_spec(spec: &VersionSpec, default_branch: &str) -> Self {
        match spec {
            VersionSpec::Latest => Self::Upstream(default_branch.to_string()),
            VersionSpec::Tag(tag) => Self::Tag(tag.clone()),
            VersionSpec::Commit(commit) => Self::Commit(commit.clone()),
        }
    }

    /// Name of the commit this ref points at.
    pub fn checkout_arg(&self) -> String {
        match self {
            Self::Branch(branch) => branch.clone(),
            Self::Upstream(branch) => format!("{REMOTE}/{branch}"),
            Self::Tag(tag) => format!("tags/{tag}"),
            Self::Commit(commit) => commit.clone(),
        }
    }

    /// Arguments following `git checkout -f`.
    pub fn checkout_args(&self) -> Vec<String> {
        match self {
            Self::Upstream(branch) => vec!["-B".to_string(), branch.clone(), self.checkout_arg()],
            _ => vec![self.checkout_arg()],
        }
    }
}

impl std::fmt::Display for GitRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.checkout_arg())
    }
}

pub trait Vcs: Send + Sync {
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<()>;

    /// Update remote-tracking refs and tags without touching the work tree.
    fn fetch(&self, repo: &Path) -> Result<()>;

    fn pull(&self, repo: &Path) -> Result<()>;

    /// Forced checkout: local modifications in the working tree are discarded.
    fn checkout(&self, repo: &Path, target: &GitRef) -> Result<()>;

    /// Full hash of `HEAD`.
    fn head_commit(&self, repo: &Path) -> Result<String>;

    /// Name of the checked-out branch (`HEAD` when detached).
    fn current_branch(&self, repo: &Path) -> Result<String>;

    /// Branch a workspace returns to after version checkouts.
    fn default_branch(&self, repo: &Path) -> Result<String> {
        self.current_branch(repo)
    }

    /// Initialize (recursively) the submodule at `path` inside `repo`.
    fn update_submodule(&self, repo: &Path, path: &Path) -> Result<()>;
}

/// [`Vcs`] backed by the `git` executable on `PATH`.
#[derive(Debug, Clone, Default)]
pub struct GitCli {
    config: Vec<String>,
}

impl GitCli {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pass `-c key=value` to every git invocation.
    pub fn with_config(mut self, key: &str, value: &str) -> Self {
        self.config.push(format!("{key}={value}"));
        self
    }

    fn run(&self, args: &[&str], cwd: Option<&Path>) -> Result<String> {
        let mut cmd = Command::new("git");
        for entry in &self.config {
            cmd.arg("-c").arg(entry);
        }
        cmd.args(args);
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }
        tracing::debug!("git {}", args.join(" "));

        let out = cmd
            .output()
            .map_err(|e| PlutoError::io(cwd.unwrap_or(Path::new(".")), e))?;
        if !out.status.success() {
            return Err(PlutoError::Vcs {
                command: args.join(" "),
                stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&out.stdout).trim().to_string())
    }
}

impl Vcs for GitCli {
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<()> {
        let dest = dest.to_string_lossy();
        self.run(&["clone", url, &dest], None).map(drop)
    }

    fn fetch(&self, repo: &Path) -> Result<()> {
        self.run(&["fetch", "--tags", REMOTE], Some(repo)).map(drop)
    }

    fn pull(&self, repo: &Path) -> Result<()> {
        self.run(&["pull"], Some(repo)).map(drop)
    }

    fn checkout(&self, repo: &Path, target: &GitRef) -> Result<()> {
        let target_args = target.checkout_args();
        let mut args = vec!["checkout", "-f"];
        args.extend(target_args.iter().map(String::as_str));
        self.run(&args, Some(repo)).map(drop)
    }

    fn head_commit(&self, repo: &Path) -> Result<String> {
        self.run(&["log", "-1", "--format=%H"], Some(repo))
    }

    fn current_branch(&self, repo: &Path) -> Result<String> {
        self.run(&["rev-parse", "--abbrev-ref", "HEAD"], Some(repo))
    }

    fn default_branch(&self, repo: &Path) -> Result<String> {
        let current = self.current_branch(repo)?;
        if current != "HEAD" {
            return Ok(current);
        }
        // Fresh submodules start detached; ask the remote instead.
        let head_ref = format!("refs/remotes/{REMOTE}/HEAD");
        let remote = self.run(&["symbolic-ref", "--short", &head_ref], Some(repo))?;
        Ok(remote
            .strip_prefix(&format!("{REMOTE}/"))
            .unwrap_or(&remote)
            .to_string())
    }

    fn update_submodule(&self, repo: &Path, path: &Path) -> Result<()> {
        let path = path.to_string_lossy();
        self.run(
            &["submodule", "update", "--init", "--recursive", "--", &path],
            Some(repo),
        )
        .map(drop)
    }
}
