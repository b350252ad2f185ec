//! pluto - a lightweight Lua package manager
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
//!
//! Resolves a project's `module.json` against a local mirror of the
//! package registry, pins every dependency to a git revision and copies
//! the resulting trees into `pluto_modules/`.
//!
//! # Directory Layout
//!
//! ```text
//! $PLUTO_HOME/
//! ├── metadata/       # Registry clone, one submodule workspace per package
//! ├── module-cache/   # Frozen trees by name@tag, name#commit
//! └── moduleMap.json  # Package name <-> registry folder index
//! ```

pub mod cmd;
pub mod ops;
pub mod ui;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "pluto")]
#[command(author, version = env!("PLUTO_VERSION"), about = "pluto - a lightweight Lua package manager")]
pub struct Cli {
    /// Show debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Data directory (overrides PLUTO_HOME)
    #[arg(long, global = true)]
    pub home: Option<PathBuf>,

    /// Maximum number of packages installed at once (overrides PLUTO_JOBS)
    #[arg(short, long, global = true)]
    pub jobs: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Download or refresh the package registry
    Fetch {
        /// Registry git URL (overrides PLUTO_REGISTRY)
        #[arg(long)]
        registry: Option<String>,
    },
    /// Add a direct dependency to module.json
    Add {
        /// Package: name, name@tag or name#commit
        package: String,
        #[command(flatten)]
        pin: PinArgs,
        /// Track the default branch
        #[arg(short, long, conflicts_with_all = ["tag", "commit"])]
        latest: bool,
        /// Add even if the package is incompatible with this project
        #[arg(short, long)]
        bypass: bool,
    },
    /// Install everything module.json needs that is not installed yet
    Install,
    /// Reinstall everything from scratch, picking up new branch tips
    Update,
    /// Remove a direct dependency and anything only it needed
    Remove {
        /// Package name
        package: String,
    },
    /// Pin a direct dependency to a tag or commit (latest if neither)
    Lock {
        /// Package name
        package: String,
        #[command(flatten)]
        pin: PinArgs,
    },
    /// Pin a direct dependency back to latest
    Unlock {
        /// Package name
        package: String,
    },
    /// List packages
    List {
        #[command(flatten)]
        scope: ListScope,
    },
    /// Show a package's registry entry
    Inspect {
        /// Package name
        package: String,
        /// List every tag
        #[arg(short, long)]
        tags: bool,
        /// List every commit
        #[arg(short, long)]
        commits: bool,
    },
}

#[derive(Debug, Args)]
pub struct PinArgs {
    /// Git tag to pin to
    #[arg(short, long, conflicts_with = "commit")]
    pub tag: Option<String>,
    /// Commit hash (or prefix) to pin to
    #[arg(short, long)]
    pub commit: Option<String>,
}

#[derive(Debug, Args)]
#[group(multiple = false)]
pub struct ListScope {
    /// Packages installed in this project
    #[arg(short, long)]
    pub installed: bool,
    /// Direct dependencies of this project
    #[arg(short, long)]
    pub direct: bool,
    /// Every package in the registry
    #[arg(short, long)]
    pub all: bool,
}
