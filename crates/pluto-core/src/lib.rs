pub mod cache;
pub mod config;
pub mod edit;
pub mod error;
pub mod fsutil;
pub mod install;
pub mod paths;
pub mod project;
pub mod reconcile;
pub mod remove;
pub mod reporter;
pub mod resolver;
pub mod store;
pub mod sync;
pub mod vcs;
pub mod workspace;

#[cfg(test)]
pub(crate) mod testing;

pub use config::Config;
pub use error::{PlutoError, Result};
pub use paths::{HomeLayout, ProjectLayout};
pub use reporter::{NullReporter, Reporter};
