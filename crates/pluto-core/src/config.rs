//! Runtime configuration resolved from the environment.

use std::path::PathBuf;

/// Git URL of the public metadata registry.
pub const DEFAULT_REGISTRY: &str = "https://github.com/qeffects/pluto-packages.git";

/// Settings shared by every command.
#[derive(Debug, Clone)]
pub struct Config {
    /// Machine-local data directory (`PLUTO_HOME`).
    pub home: PathBuf,
    /// Metadata registry remote (`PLUTO_REGISTRY`).
    pub registry_url: String,
    /// Maximum packages installed concurrently (`PLUTO_JOBS`).
    pub jobs: usize,
}

impl Config {
    /// Build a config from `PLUTO_HOME`, `PLUTO_REGISTRY` and `PLUTO_JOBS`,
    /// falling back to defaults for anything unset.
    pub fn from_env() -> Option<Self> {
        let home = match std::env::var_os("PLUTO_HOME") {
            Some(home) if !home.is_empty() => PathBuf::from(home),
            _ => default_home()?,
        };
        let registry_url = std::env::var("PLUTO_REGISTRY")
            .ok()
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_REGISTRY.to_string());
        let jobs = std::env::var("PLUTO_JOBS")
            .ok()
            .and_then(|j| j.parse().ok())
            .unwrap_or_else(num_cpus::get);

        Some(Self::new(home, registry_url, jobs))
    }

    pub fn new(home: PathBuf, registry_url: String, jobs: usize) -> Self {
        Self {
            home,
            registry_url,
            jobs: jobs.max(1),
        }
    }
}

fn default_home() -> Option<PathBuf> {
    dirs::data_dir()
        .map(|d| d.join("pluto"))
        .or_else(|| dirs::home_dir().map(|h| h.join(".pluto")))
}
