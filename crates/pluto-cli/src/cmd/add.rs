//! Add command
use anyhow::{Result, bail};
use pluto_core::edit;
use pluto_schema::{PackageRef, ReverseMapKey, VersionSpec};

use super::pin_from_args;
use crate::PinArgs;
use crate::ops::Context;

/// Validate a package pin and record it in module.json.
pub async fn add(
    ctx: &Context,
    package: &str,
    pin: &PinArgs,
    latest: bool,
    bypass: bool,
) -> Result<()> {
    let reference: PackageRef = package.parse()?;
    let spec = if latest {
        VersionSpec::Latest
    } else {
        pin_from_args(pin).unwrap_or(reference.spec)
    };

    let mut project = ctx.project().await?;
    let store = ctx.store()?;
    let plan = edit::plan_add(&project.manifest, &store, &reference.name, spec)?;

    let manifest = &plan.manifest;
    if plan.compat.runtime {
        ctx.output.success(&format!(
            "Runtime {} works on {}",
            manifest.runtime, project.manifest.runtime
        ));
    } else {
        ctx.output.warning(&format!(
            "Runtime {} is not compatible with {}",
            manifest.runtime, project.manifest.runtime
        ));
    }
    if plan.compat.frameworks {
        ctx.output.success(&format!(
            "Frameworks [{}] work with [{}]",
            manifest.frameworks.join(", "),
            project.manifest.frameworks.join(", ")
        ));
    } else {
        ctx.output.warning(&format!(
            "Frameworks [{}] are not compatible with [{}]",
            manifest.frameworks.join(", "),
            project.manifest.frameworks.join(", ")
        ));
    }

    if !plan.compat.is_compatible() && !bypass && !ctx.output.confirm("Add anyway?")? {
        bail!("Aborted: {} is not compatible with this project", plan.name);
    }

    let key = ReverseMapKey::new(&plan.name, &plan.spec);
    if let Some(previous) = edit::apply_add(&mut project.manifest, plan) {
        ctx.output.info(&format!("Replaced previous pin {previous}"));
    }
    project.save_manifest().await?;

    ctx.output.success(&format!(
        "Added {} to module.json, run `pluto install` to fetch it",
        ctx.output.key(key.as_str())
    ));
    Ok(())
}
