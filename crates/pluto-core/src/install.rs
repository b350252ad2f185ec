//! The install engine.
//!
//! Works on the new-only [`Delta`] produced by the reconciler. Targets are
//! grouped by package name: each name owns one VCS workspace, so all of its
//! versions are processed one after another under a single lease, while
//! different names run concurrently up to the configured job limit.
//!
//! The lockfile and mapping are written only if every package succeeded.

use pluto_schema::{LockFile, ModuleMapping, PackageName, ResolvedPackage, ReverseMapKey};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::sync::Semaphore;

use crate::cache::ModuleCache;
use crate::error::{PlutoError, Result};
use crate::fsutil;
use crate::paths::{HomeLayout, ProjectLayout};
use crate::reconcile::{self, Delta};
use crate::reporter::Reporter;
use crate::store;
use crate::vcs::Vcs;
use crate::workspace::{WorkspaceLease, WorkspacePool};

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOutcome {
    pub lock: LockFile,
    /// Targets copied into the project this run.
    pub installed: usize,
}

/// State shared by every per-package task.
struct Shared {
    home: HomeLayout,
    project: ProjectLayout,
    vcs: Arc<dyn Vcs>,
    cache: ModuleCache,
    reporter: Arc<dyn Reporter>,
    /// Submodule commands all run against the one registry checkout.
    registry: Mutex<()>,
}

/// One package name and the targets to install from its workspace.
struct PackageJob {
    name: PackageName,
    folder: String,
    targets: Vec<ResolvedPackage>,
}

pub struct Installer {
    home: HomeLayout,
    vcs: Arc<dyn Vcs>,
    cache: ModuleCache,
    pool: Arc<WorkspacePool>,
    reporter: Arc<dyn Reporter>,
    jobs: usize,
}

impl Installer {
    pub fn new(
        home: HomeLayout,
        vcs: Arc<dyn Vcs>,
        reporter: Arc<dyn Reporter>,
        jobs: usize,
    ) -> Result<Self> {
        let cache = ModuleCache::open(home.cache_dir())?;
        Ok(Self {
            home,
            vcs,
            cache,
            pool: Arc::new(WorkspacePool::new()),
            reporter,
            jobs: jobs.max(1),
        })
    }

    pub fn cache(&self) -> &ModuleCache {
        &self.cache
    }

    /// Install `delta` into `project`, then persist the merged lock and the
    /// updated mapping.
    pub async fn install(
        &self,
        project: &ProjectLayout,
        delta: &Delta,
        previous: Option<&LockFile>,
        mapping: &mut ModuleMapping,
    ) -> Result<InstallOutcome> {
        if delta.is_empty() {
            self.reporter.info("Everything is up to date");
            return Ok(InstallOutcome {
                lock: previous.cloned().unwrap_or_default(),
                installed: 0,
            });
        }

        let started = Instant::now();
        let jobs = plan(delta, mapping)?;
        fsutil::ensure_dir(&project.modules_dir())?;

        self.reporter.section("Installing");
        let installed = self.run_jobs(project, jobs).await?;

        for name in &delta.submodules {
            mapping.mark_cached(name);
        }
        store::save_mapping(&self.home, mapping)?;

        let completed = Delta {
            real: delta
                .real
                .iter()
                .map(|p| installed.get(&p.reverse_map_key).cloned().unwrap_or_else(|| p.clone()))
                .collect(),
            ..delta.clone()
        };
        let lock = reconcile::merge(previous, &completed);
        fsutil::write_json_atomic(&project.lockfile(), &lock)?;

        self.reporter
            .summary(installed.len(), "installed", started.elapsed().as_secs_f64());
        Ok(InstallOutcome {
            lock,
            installed: installed.len(),
        })
    }

    async fn run_jobs(
        &self,
        project: &ProjectLayout,
        jobs: Vec<PackageJob>,
    ) -> Result<HashMap<ReverseMapKey, ResolvedPackage>> {
        let shared = Arc::new(Shared {
            home: self.home.clone(),
            project: project.clone(),
            vcs: Arc::clone(&self.vcs),
            cache: self.cache.clone(),
            reporter: Arc::clone(&self.reporter),
            registry: Mutex::new(()),
        });
        let permits = Arc::new(Semaphore::new(self.jobs));
        let mut set: tokio::task::JoinSet<Result<Vec<ResolvedPackage>>> =
            tokio::task::JoinSet::new();

        for job in jobs {
            let shared = Arc::clone(&shared);
            let permits = Arc::clone(&permits);
            let pool = Arc::clone(&self.pool);

            set.spawn(async move {
                // The semaphore is never closed.
                let _permit = permits.acquire_owned().await.ok();
                let guard = pool.acquire(&job.name).await;
                tokio::task::spawn_blocking(move || install_package(&shared, job, guard)).await?
            });
        }

        let mut installed = HashMap::new();
        let mut first_error = None;
        while let Some(res) = set.join_next().await {
            match res.map_err(PlutoError::from).and_then(|r| r) {
                Ok(packages) => {
                    installed.extend(packages.into_iter().map(|p| (p.reverse_map_key.clone(), p)));
                }
                Err(e) => {
                    self.reporter.error(&format!("Install failed: {e}"));
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(installed),
        }
    }
}

/// Group the delta's targets by package name, in submodule order.
fn plan(delta: &Delta, mapping: &ModuleMapping) -> Result<Vec<PackageJob>> {
    delta
        .submodules
        .iter()
        .map(|name| {
            let folder = mapping
                .folder_for(name)
                .ok_or_else(|| PlutoError::PackageNotAvailable(name.clone()))?;
            Ok(PackageJob {
                name: name.clone(),
                folder: folder.to_string(),
                targets: delta.real.iter().filter(|p| &p.name == name).cloned().collect(),
            })
        })
        .collect()
}

/// Order a package's targets for one workspace: the `Latest` target
/// first, everything else in encounter order.
fn operation_queue(mut targets: Vec<ResolvedPackage>) -> Vec<ResolvedPackage> {
    targets.sort_by_key(|p| !p.version.is_latest());
    targets
}

fn install_package(
    shared: &Shared,
    job: PackageJob,
    guard: tokio::sync::OwnedMutexGuard<()>,
) -> Result<Vec<ResolvedPackage>> {
    let workspace: PathBuf = shared.home.workspace(&job.folder);
    {
        let _registry = shared
            .registry
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        shared.vcs.update_submodule(
            &shared.home.metadata_dir(),
            &HomeLayout::workspace_relative(&job.folder),
        )?;
    }
    tracing::debug!("Checked out workspace for {}", job.name);

    let lease = WorkspaceLease::open(guard, workspace, Arc::clone(&shared.vcs))?;
    if job.targets.iter().any(|t| t.version.is_latest()) {
        lease.refresh();
    }
    let mut done = Vec::with_capacity(job.targets.len());

    for mut target in operation_queue(job.targets) {
        let revision = lease.checkout(&target.version)?;
        let slot = ModuleCache::slot_key(&target, &revision);

        if shared.cache.contains(&slot) {
            shared.reporter.cache_hit(&slot);
        } else if shared.cache.populate(&slot, lease.path())? {
            shared.reporter.cached(&slot, &revision);
        }

        let dest = shared.project.install_dir(&target.reverse_map_key);
        shared.cache.materialize(&slot, &dest)?;
        shared.reporter.installed(&target.reverse_map_key, &revision);

        target.installed_commit = Some(revision);
        done.push(target);
    }

    lease.release()?;
    Ok(done)
}
