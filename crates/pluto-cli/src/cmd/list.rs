//! List command
use anyhow::{Result, bail};
use comfy_table::Cell;
use pluto_core::project::Project;
use pluto_core::store::{ManifestSource, MetadataStore};
use pluto_schema::CompatReport;

use crate::ListScope;
use crate::ops::Context;
use crate::ui::table::{flag, table};

pub async fn list(ctx: &Context, scope: &ListScope) -> Result<()> {
    let store = ctx.store()?;
    let project = ctx.try_project().await?;

    if scope.installed || scope.direct {
        let Some(project) = project else {
            bail!("No module.json in the current directory");
        };
        if scope.installed {
            list_installed(ctx, &project);
        } else {
            list_direct(ctx, &project, &store);
        }
        return Ok(());
    }

    list_available(ctx, project.as_ref(), &store, scope.all);
    Ok(())
}

fn list_available(ctx: &Context, project: Option<&Project>, store: &MetadataStore, all: bool) {
    let show_flags = all && project.is_some();
    let mut header = vec!["name", "author", "latest", "runtime", "frameworks", "description"];
    if show_flags {
        header.extend(["runtime ok", "frameworks ok"]);
    }
    let mut rows = table(&header);

    let mut shown = 0;
    for manifest in store.all_manifests() {
        let compat = project.map(|p| CompatReport::check(&manifest, &p.manifest));
        if !all && compat.is_some_and(|c| !c.is_compatible()) {
            continue;
        }

        let mut row = vec![
            Cell::new(manifest.name.as_str()),
            Cell::new(&manifest.author.name),
            Cell::new(manifest.short_latest_commit()),
            Cell::new(&manifest.runtime),
            Cell::new(manifest.frameworks.join(", ")),
            Cell::new(&manifest.description),
        ];
        if let Some(compat) = compat.filter(|_| show_flags) {
            row.push(flag(compat.runtime));
            row.push(flag(compat.frameworks));
        }
        rows.add_row(row);
        shown += 1;
    }

    if shown == 0 {
        ctx.output.info("No packages found (try `pluto fetch`)");
        return;
    }
    println!("{rows}");
    ctx.output.info(&format!("{shown} packages"));
}

fn list_installed(ctx: &Context, project: &Project) {
    let Some(lock) = project.lock.as_ref().filter(|l| !l.is_empty()) else {
        ctx.output.info("Nothing installed");
        return;
    };

    let mut rows = table(&["package", "pin", "commit", "required by"]);
    for package in &lock.real_package_list {
        let commit = package
            .installed_commit
            .as_deref()
            .map_or("", |c| c.get(..8).unwrap_or(c));
        let required_by: Vec<String> = package.installed_by.iter().map(ToString::to_string).collect();
        rows.add_row(vec![
            Cell::new(package.reverse_map_key.as_str()),
            Cell::new(package.version.label()),
            Cell::new(commit),
            Cell::new(required_by.join(", ")),
        ]);
    }
    println!("{rows}");
}

fn list_direct(ctx: &Context, project: &Project, store: &MetadataStore) {
    if project.manifest.dependencies.is_empty() {
        ctx.output.info("No direct dependencies");
        return;
    }

    let mut rows = table(&["package", "pin", "installed", "compatible"]);
    for (name, spec) in &project.manifest.dependencies {
        let key = pluto_schema::ReverseMapKey::new(name, spec);
        let installed = project.lock.as_ref().is_some_and(|l| l.contains(&key));
        let compatible = match store.package_manifest(name) {
            Ok(manifest) => flag(CompatReport::check(&manifest, &project.manifest).is_compatible()),
            Err(_) => Cell::new("unknown"),
        };
        rows.add_row(vec![
            Cell::new(name.as_str()),
            Cell::new(spec.label()),
            flag(installed),
            compatible,
        ]);
    }
    println!("{rows}");
}
