//! Update command
use anyhow::{Context as _, Result};

use crate::ops::Context;
use crate::ops::install::install_project;

/// Throw away the installed tree and lock, then install from scratch.
pub async fn update(ctx: &Context) -> Result<()> {
    let mut project = ctx.project().await?;

    let modules = project.layout.modules_dir();
    if tokio::fs::try_exists(&modules).await.unwrap_or(false) {
        tokio::fs::remove_dir_all(&modules)
            .await
            .with_context(|| format!("Failed to remove {}", modules.display()))?;
    }
    let lockfile = project.layout.lockfile();
    if tokio::fs::try_exists(&lockfile).await.unwrap_or(false) {
        tokio::fs::remove_file(&lockfile)
            .await
            .with_context(|| format!("Failed to remove {}", lockfile.display()))?;
    }
    project.lock = None;
    ctx.output.info("Cleared installed modules and lockfile");

    install_project(ctx, &mut project).await?;
    Ok(())
}
