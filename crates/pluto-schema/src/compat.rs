//! Runtime and framework compatibility lattices.
//!
//! Each target identifier maps to the set of *actual* environments it is
//! declared to work under. The tables are closed at definition time, so a
//! lookup is a single membership test and never walks the lattice.
//!
//! Direction matters: the target is what a package declares, the actual is
//! what the consuming project declares.

use serde::Serialize;

/// Matches any runtime or framework.
pub const WILDCARD: &str = "*";

const ALL_RUNTIMES: &[&str] = &[
    WILDCARD,
    "Lua5.4",
    "Lua5.3",
    "Lua5.2",
    "Lua5.1",
    "Lua5.0",
    "Luau",
    "Luajit2.0",
    "Luajit2.1",
    "Luajit2.1beta3",
];

const ALL_FRAMEWORKS: &[&str] = &[WILDCARD, "love12", "love11", "love10", "lapis", "gmod", "roblox"];

/// Every runtime identifier the lattice knows about.
pub const KNOWN_RUNTIMES: &[&str] = ALL_RUNTIMES;

/// Every framework identifier the lattice knows about.
pub const KNOWN_FRAMEWORKS: &[&str] = ALL_FRAMEWORKS;

/// Actual runtimes a package targeting `target` can run on.
///
/// Returns `None` for an identifier outside the lattice.
pub fn runtime_targets(target: &str) -> Option<&'static [&'static str]> {
    let set: &'static [&'static str] = match target {
        "*" | "Lua5.0" => ALL_RUNTIMES,
        "Lua5.1" => &[
            WILDCARD,
            "Lua5.4",
            "Lua5.3",
            "Lua5.2",
            "Lua5.1",
            "Luau",
            "Luajit2.0",
            "Luajit2.1",
            "Luajit2.1beta3",
        ],
        "Lua5.2" => &[WILDCARD, "Lua5.4", "Lua5.3", "Lua5.2"],
        "Lua5.3" => &[WILDCARD, "Lua5.4", "Lua5.3"],
        "Lua5.4" => &[WILDCARD, "Lua5.4"],
        "Luau" => &[WILDCARD, "Luau"],
        "Luajit2.0" => &[WILDCARD, "Luajit2.0", "Luajit2.1", "Luajit2.1beta3"],
        "Luajit2.1" => &[WILDCARD, "Luajit2.1", "Luajit2.1beta3"],
        "Luajit2.1beta3" => &[WILDCARD, "Luajit2.1beta3"],
        _ => return None,
    };
    Some(set)
}

/// Actual frameworks a package targeting `target` can run under.
pub fn framework_targets(target: &str) -> Option<&'static [&'static str]> {
    let set: &'static [&'static str] = match target {
        "*" => ALL_FRAMEWORKS,
        "love12" => &[WILDCARD, "love12"],
        "love11" => &[WILDCARD, "love11"],
        "love10" => &[WILDCARD, "love10"],
        "lapis" => &[WILDCARD, "lapis"],
        "gmod" => &[WILDCARD, "gmod"],
        "roblox" => &[WILDCARD, "roblox"],
        _ => return None,
    };
    Some(set)
}

/// Returns `true` if a package targeting runtime `target` works on `actual`.
///
/// Unknown targets are never compatible.
pub fn is_runtime_compatible(target: &str, actual: &str) -> bool {
    runtime_targets(target).is_some_and(|set| set.contains(&actual))
}

/// Returns `true` if *any* target framework accepts *any* actual framework.
///
/// Unknown targets are skipped rather than rejected.
pub fn is_framework_compatible<T, A>(targets: &[T], actuals: &[A]) -> bool
where
    T: AsRef<str>,
    A: AsRef<str>,
{
    targets
        .iter()
        .filter_map(|t| framework_targets(t.as_ref()))
        .any(|set| actuals.iter().any(|a| set.contains(&a.as_ref())))
}

/// Outcome of checking one package against one project.
///
/// A mismatch is advisory: callers surface it and ask before proceeding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompatReport {
    /// The package's runtime accepts the project's runtime.
    pub runtime: bool,
    /// At least one of the package's frameworks accepts one of the project's.
    pub frameworks: bool,
}

impl CompatReport {
    /// Compare a package manifest against a project manifest.
    pub fn check(
        package: &crate::PackageManifest,
        project: &crate::ProjectManifest,
    ) -> Self {
        Self {
            runtime: is_runtime_compatible(&package.runtime, &project.runtime),
            frameworks: is_framework_compatible(&package.frameworks, &project.frameworks),
        }
    }

    /// Both checks passed.
    pub fn is_compatible(self) -> bool {
        self.runtime && self.frameworks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_direction() {
        assert!(is_runtime_compatible("Lua5.3", "Lua5.4"));
        assert!(!is_runtime_compatible("Lua5.4", "Lua5.3"));
        assert!(!is_runtime_compatible("Luau", "Lua5.1"));
        assert!(is_runtime_compatible("Lua5.1", "Luau"));
        assert!(is_runtime_compatible("Luajit2.0", "Luajit2.1beta3"));
    }

    #[test]
    fn test_runtime_wildcard_and_unknown() {
        for runtime in KNOWN_RUNTIMES {
            assert!(is_runtime_compatible(runtime, runtime), "{runtime} rejects itself");
            assert!(is_runtime_compatible(runtime, WILDCARD));
            assert!(is_runtime_compatible(WILDCARD, runtime));
        }
        assert!(!is_runtime_compatible("Lua6.0", "Lua5.4"));
        assert!(!is_runtime_compatible("Lua5.4", "Lua6.0"));
    }

    #[test]
    fn test_runtime_lattice_is_closed() {
        // If A accepts B and B accepts C, A must already accept C.
        for a in KNOWN_RUNTIMES {
            let a_set = runtime_targets(a).unwrap();
            for b in a_set.iter().filter(|b| **b != WILDCARD) {
                for c in runtime_targets(b).unwrap() {
                    assert!(a_set.contains(c), "{a} -> {b} -> {c} not closed");
                }
            }
        }
    }

    #[test]
    fn test_framework_existential() {
        assert!(is_framework_compatible(&["love11", "gmod"], &["gmod"]));
        assert!(!is_framework_compatible(&["love11"], &["love12"]));
        assert!(is_framework_compatible(&["*"], &["roblox"]));
        assert!(is_framework_compatible(&["lapis"], &["*"]));
        assert!(is_framework_compatible(&["bogus", "lapis"], &["lapis"]));
        assert!(!is_framework_compatible(&["bogus"], &["*"]));

        let none: [&str; 0] = [];
        assert!(!is_framework_compatible(&none, &["love11"]));
    }

    #[test]
    fn test_report() {
        let package = crate::PackageManifest {
            runtime: "Lua5.1".into(),
            frameworks: vec!["love11".into()],
            ..Default::default()
        };
        let project = crate::ProjectManifest {
            runtime: "Luajit2.1".into(),
            frameworks: vec!["love12".into()],
            ..Default::default()
        };

        let report = CompatReport::check(&package, &project);
        assert!(report.runtime);
        assert!(!report.frameworks);
        assert!(!report.is_compatible());
    }
}
