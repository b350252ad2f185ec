//! Fetch command
use anyhow::{Context as _, Result};
use pluto_core::sync;

use crate::ops::Context;

/// Clone or refresh the registry and rebuild the package index.
pub async fn fetch(ctx: &Context, registry: Option<String>) -> Result<()> {
    let url = registry.unwrap_or_else(|| ctx.config.registry_url.clone());
    ctx.output.section("Fetching");

    let home = ctx.home.clone();
    let vcs = ctx.vcs.clone();
    let output = ctx.output.clone();
    tokio::task::spawn_blocking(move || sync::fetch(&home, &url, vcs.as_ref(), output.as_ref()))
        .await?
        .context("Failed to sync the package registry")?;

    Ok(())
}
