//! pluto CLI

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pluto_cli::cmd;
use pluto_cli::ops::Context;
use pluto_cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if !pluto_cli::ui::output::color_enabled() {
        crossterm::style::force_color_output(false);
    }

    let ctx = Context::new(cli.home, cli.jobs)?;

    match cli.command {
        Commands::Fetch { registry } => cmd::fetch::fetch(&ctx, registry).await,
        Commands::Add {
            package,
            pin,
            latest,
            bypass,
        } => cmd::add::add(&ctx, &package, &pin, latest, bypass).await,
        Commands::Install => cmd::install::install(&ctx).await,
        Commands::Update => cmd::update::update(&ctx).await,
        Commands::Remove { package } => cmd::remove::remove(&ctx, &package).await,
        Commands::Lock { package, pin } => cmd::lock::lock(&ctx, &package, &pin).await,
        Commands::Unlock { package } => cmd::lock::unlock(&ctx, &package).await,
        Commands::List { scope } => cmd::list::list(&ctx, &scope).await,
        Commands::Inspect {
            package,
            tags,
            commits,
        } => cmd::inspect::inspect(&ctx, &package, tags, commits).await,
    }
}
