//! Resolve, diff and install a project. Shared by `install` and `update`.

use anyhow::{Context as _, Result};
use pluto_core::install::{InstallOutcome, Installer};
use pluto_core::project::Project;
use pluto_core::{reconcile, resolver};
use pluto_schema::ReverseMapKey;

use super::Context;

pub async fn install_project(ctx: &Context, project: &mut Project) -> Result<InstallOutcome> {
    let store = ctx.store()?;

    ctx.output.section("Resolving");
    let resolution = resolver::resolve(&project.manifest, &store)
        .context("Failed to resolve dependencies")?;
    let delta = reconcile::diff(&resolution, project.lock.as_ref());

    if project.lock.is_some() && !delta.is_empty() {
        let keys: Vec<&str> = delta.flat.iter().map(ReverseMapKey::as_str).collect();
        ctx.output.info(&format!("New packages: {}", keys.join(", ")));
    }

    let mut mapping = store.mapping().clone();
    let installer = Installer::new(ctx.home.clone(), ctx.vcs.clone(), ctx.reporter(), ctx.config.jobs)?;
    let outcome = installer
        .install(&project.layout, &delta, project.lock.as_ref(), &mut mapping)
        .await?;

    if outcome.installed > 0 {
        project.lock = Some(outcome.lock.clone());
    }
    Ok(outcome)
}
