//! Remove command
use anyhow::Result;
use pluto_core::remove;
use pluto_schema::PackageName;

use crate::ops::Context;

pub async fn remove(ctx: &Context, package: &str) -> Result<()> {
    let name = PackageName::parse(package)?;
    let mut project = ctx.project().await?;

    let removal = remove::remove(&mut project, &name, ctx.output.as_ref()).await?;
    ctx.output.success(&format!(
        "Removed {} and {} dependent package(s)",
        ctx.output.key(name.as_str()),
        removal.removed.len().saturating_sub(1)
    ));
    Ok(())
}
