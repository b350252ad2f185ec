//! Install command
use anyhow::Result;

use crate::ops::Context;
use crate::ops::install::install_project;

pub async fn install(ctx: &Context) -> Result<()> {
    let mut project = ctx.project().await?;
    install_project(ctx, &mut project).await?;
    Ok(())
}
