//! Lock and unlock commands
use anyhow::Result;
use pluto_core::edit;
use pluto_schema::{PackageName, VersionSpec};

use super::pin_from_args;
use crate::PinArgs;
use crate::ops::Context;

/// Re-pin a direct dependency. Takes effect on the next `pluto update`.
pub async fn lock(ctx: &Context, package: &str, pin: &PinArgs) -> Result<()> {
    let name = PackageName::parse(package)?;
    let spec = pin_from_args(pin).unwrap_or(VersionSpec::Latest);
    let mut project = ctx.project().await?;
    let store = ctx.store()?;

    let previous = edit::lock(&mut project.manifest, &store, &name, spec.clone())?;
    project.save_manifest().await?;

    ctx.output.success(&format!(
        "Pinned {} {} (was {})",
        ctx.output.key(name.as_str()),
        spec,
        previous
    ));
    ctx.output.info("Run `pluto update` to apply");
    Ok(())
}

pub async fn unlock(ctx: &Context, package: &str) -> Result<()> {
    let name = PackageName::parse(package)?;
    let mut project = ctx.project().await?;

    let previous = edit::unlock(&mut project.manifest, &name)?;
    project.save_manifest().await?;

    ctx.output.success(&format!(
        "Unpinned {} (was {previous})",
        ctx.output.key(name.as_str())
    ));
    ctx.output.info("Run `pluto update` to apply");
    Ok(())
}
