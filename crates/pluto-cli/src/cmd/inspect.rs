//! Inspect command
use anyhow::Result;
use comfy_table::Cell;
use crossterm::style::{Color, Stylize};
use pluto_core::store::ManifestSource;
use pluto_schema::{CompatReport, PackageName};

use crate::ops::Context;
use crate::ui::table::{flag, table};
use crate::ui::theme::format_size;

/// Show a package's registry entry and how it fits the current project.
pub async fn inspect(ctx: &Context, package: &str, tags: bool, commits: bool) -> Result<()> {
    let name = PackageName::parse(package)?;
    let store = ctx.store()?;
    let manifest = store.package_manifest(&name)?;
    let project = ctx.try_project().await?;

    let lw: usize = 14;
    println!();
    println!(
        "  {} {}",
        ctx.output.paint_bold(manifest.name.as_str(), Color::White),
        ctx.output
            .paint(&format!("#{}", manifest.short_latest_commit()), Color::DarkGrey)
    );
    if !manifest.description.is_empty() {
        println!("  {}", manifest.description);
    }
    println!();

    let author = match (&manifest.author.github, &manifest.author.email) {
        (Some(github), _) => format!("{} ({github})", manifest.author.name),
        (None, Some(email)) => format!("{} <{email}>", manifest.author.name),
        (None, None) => manifest.author.name.clone(),
    };
    for (label, value) in [
        ("author", author),
        ("license", manifest.license.clone()),
        ("website", manifest.website.clone()),
        ("docs", manifest.documentation.clone()),
        ("source", manifest.github.clone()),
        ("runtime", manifest.runtime.clone()),
        ("frameworks", manifest.frameworks.join(", ")),
        ("size", format_size(manifest.size)),
    ] {
        if !value.is_empty() {
            println!("  {label:<lw$}{value}");
        }
    }

    if !manifest.dependencies.is_empty() {
        let deps: Vec<String> = manifest
            .dependencies
            .iter()
            .map(|(dep, spec)| pluto_schema::ReverseMapKey::new(dep, spec).to_string())
            .collect();
        println!("  {:<lw$}{}", "requires", deps.join(", "));
    }

    if let Some(project) = &project {
        let compat = CompatReport::check(&manifest, &project.manifest);
        let direct = project.manifest.dependencies.get(&name);
        println!();
        let mut rows = table(&["runtime ok", "frameworks ok", "direct dependency"]);
        rows.add_row(vec![
            flag(compat.runtime),
            flag(compat.frameworks),
            direct.map_or_else(|| flag(false), |spec| Cell::new(spec.label())),
        ]);
        println!("{rows}");
    }

    if tags {
        println!();
        println!("  {}", "tags".dark_grey());
        for tag in &manifest.tags {
            println!("  {tag}");
        }
    }
    if commits {
        println!();
        println!("  {}", "commits".dark_grey());
        for commit in &manifest.all_commit_hashes {
            println!("  {commit}");
        }
    }

    Ok(())
}
