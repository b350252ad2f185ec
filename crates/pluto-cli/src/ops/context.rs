//! Shared command context.
//!
//! Groups the configuration, VCS client and reporter every command needs.

use anyhow::{Context as _, Result};
use pluto_core::project::Project;
use pluto_core::store::MetadataStore;
use pluto_core::vcs::{GitCli, Vcs};
use pluto_core::{Config, HomeLayout, PlutoError, Reporter};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::ui::Output;

#[derive(Clone)]
pub struct Context {
    pub config: Config,
    pub home: HomeLayout,
    pub vcs: Arc<dyn Vcs>,
    pub output: Arc<Output>,
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Context {
    /// Resolve configuration from the environment, applying CLI overrides.
    pub fn new(home: Option<PathBuf>, jobs: Option<usize>) -> Result<Self> {
        let mut config = Config::from_env()
            .context("Could not determine a data directory. Set PLUTO_HOME to override.")?;
        if let Some(home) = home {
            config.home = home;
        }
        if let Some(jobs) = jobs {
            config.jobs = jobs.max(1);
        }

        Ok(Self {
            home: HomeLayout::new(&config.home),
            config,
            vcs: Arc::new(GitCli::new()),
            output: Arc::new(Output::new()),
        })
    }

    pub fn reporter(&self) -> Arc<dyn Reporter> {
        self.output.clone()
    }

    /// Open the local registry mirror.
    pub fn store(&self) -> Result<MetadataStore> {
        MetadataStore::open(self.home.clone()).context("Failed to open package registry")
    }

    /// Open the project in the current directory.
    pub async fn project(&self) -> Result<Project> {
        let cwd = std::env::current_dir().context("Failed to read current directory")?;
        Project::open(cwd).await.context("Failed to open project")
    }

    /// Like [`Context::project`], but a directory without `module.json` is `None`.
    pub async fn try_project(&self) -> Result<Option<Project>> {
        let cwd = std::env::current_dir().context("Failed to read current directory")?;
        match Project::open(cwd).await {
            Ok(project) => Ok(Some(project)),
            Err(PlutoError::ManifestNotFound(_)) => Ok(None),
            Err(e) => Err(e).context("Failed to open project"),
        }
    }
}
