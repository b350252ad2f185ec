//! End-to-end tests driving the `pluto` binary against a throwaway home.

use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// A throwaway `PLUTO_HOME` with a registry mirror and a project directory.
struct TestContext {
    _temp_dir: TempDir,
    home: PathBuf,
    project: PathBuf,
}

impl TestContext {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let home = temp_dir.path().join(".pluto");
        let project = temp_dir.path().join("game");
        std::fs::create_dir_all(&home).expect("failed to create pluto home");
        std::fs::create_dir_all(&project).expect("failed to create project dir");

        let ctx = Self {
            _temp_dir: temp_dir,
            home,
            project,
        };
        ctx.write_registry(&[]);
        ctx
    }

    /// Write package manifests and a matching `moduleMap.json`.
    fn write_registry(&self, packages: &[Value]) {
        let mut available = Vec::new();
        let mut to_folder = serde_json::Map::new();
        let mut to_package = serde_json::Map::new();
        for manifest in packages {
            let name = manifest["name"].as_str().expect("manifest name");
            let dir = self.home.join("metadata/packages").join(name);
            std::fs::create_dir_all(&dir).expect("failed to create package dir");
            write_json(&dir.join("manifest.json"), manifest);

            available.push(json!(name));
            to_folder.insert(name.to_string(), json!(name));
            to_package.insert(name.to_string(), json!(name));
        }

        write_json(
            &self.home.join("moduleMap.json"),
            &json!({
                "availablePackages": available,
                "cachedPackages": [],
                "packageToFolderMap": to_folder,
                "folderToPackageMap": to_package,
            }),
        );
    }

    fn write_project(&self, manifest: &Value) {
        write_json(&self.project.join("module.json"), manifest);
    }

    fn read_project(&self) -> Value {
        let raw = std::fs::read_to_string(self.project.join("module.json"))
            .expect("failed to read module.json");
        serde_json::from_str(&raw).expect("module.json is not JSON")
    }

    fn pluto(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_pluto"))
            .args(args)
            .current_dir(&self.project)
            .env("PLUTO_HOME", &self.home)
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .output()
            .expect("failed to run pluto")
    }
}

fn write_json(path: &Path, value: &Value) {
    let raw = serde_json::to_string_pretty(value).expect("failed to encode json");
    std::fs::write(path, raw).expect("failed to write json");
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn physics_manifest() -> Value {
    json!({
        "name": "physics",
        "description": "Rigid body helpers",
        "author": { "name": "ada", "github": "ada" },
        "license": "MIT",
        "runtime": "Lua5.1",
        "frameworks": ["love11"],
        "latestCommit": "0123456789abcdef",
        "allCommitHashes": ["0123456789abcdef", "fedcba9876543210"],
        "tags": ["v1.0", "v1.1"],
        "dependencies": {}
    })
}

#[test]
fn test_help_command() {
    let ctx = TestContext::new();
    let output = ctx.pluto(&["--help"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Usage:"));
}

#[test]
fn test_version_command() {
    let ctx = TestContext::new();
    let output = ctx.pluto(&["--version"]);
    assert!(output.status.success());
}

#[test]
fn test_install_without_dependencies() {
    let ctx = TestContext::new();
    ctx.write_project(&json!({ "name": "game", "runtime": "Lua5.1", "dependencies": {} }));

    let output = ctx.pluto(&["install"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Everything is up to date"));
    assert!(!ctx.project.join("pluto.lock").exists());
}

#[test]
fn test_install_outside_project_fails() {
    let ctx = TestContext::new();
    let output = ctx.pluto(&["install"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("module.json"));
}

#[test]
fn test_remove_unknown_package_fails() {
    let ctx = TestContext::new();
    ctx.write_project(&json!({ "name": "game", "dependencies": {} }));

    let output = ctx.pluto(&["remove", "physics"]);
    assert!(!output.status.success());
}

#[test]
fn test_add_records_pin() {
    let ctx = TestContext::new();
    ctx.write_registry(&[physics_manifest()]);
    ctx.write_project(&json!({
        "name": "game",
        "runtime": "Lua5.1",
        "frameworks": ["love11"],
        "dependencies": {}
    }));

    let output = ctx.pluto(&["add", "physics", "--tag", "v1.1"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let project = ctx.read_project();
    assert_eq!(project["dependencies"]["physics"], json!({ "gitTag": "v1.1" }));
    assert_eq!(project["name"], json!("game"));
}

#[test]
fn test_add_unknown_tag_leaves_manifest() {
    let ctx = TestContext::new();
    ctx.write_registry(&[physics_manifest()]);
    ctx.write_project(&json!({ "name": "game", "dependencies": {} }));

    let output = ctx.pluto(&["add", "physics", "--tag", "v9"]);
    assert!(!output.status.success());
    assert_eq!(ctx.read_project()["dependencies"], json!({}));
}

#[test]
fn test_lock_and_unlock() {
    let ctx = TestContext::new();
    ctx.write_registry(&[physics_manifest()]);
    ctx.write_project(&json!({
        "name": "game",
        "dependencies": { "physics": { "latest": true } }
    }));

    let output = ctx.pluto(&["lock", "physics", "--commit", "fedcba"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        ctx.read_project()["dependencies"]["physics"],
        json!({ "gitCommit": "fedcba" })
    );

    let output = ctx.pluto(&["unlock", "physics"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let project = ctx.read_project();
    assert_eq!(project["dependencies"]["physics"], json!({ "latest": true }));
    assert!(project.get("runtime").is_none());
    assert!(project.get("frameworks").is_none());
}

fn server_project() -> Value {
    json!({
        "name": "game",
        "runtime": "Lua5.4",
        "frameworks": ["lapis"],
        "dependencies": {}
    })
}

#[test]
fn test_add_incompatible_refuses_without_confirmation() {
    let ctx = TestContext::new();
    ctx.write_registry(&[physics_manifest()]);
    ctx.write_project(&server_project());

    // stdin is closed, so the prompt reads an empty answer.
    let output = ctx.pluto(&["add", "physics"]);
    assert!(!output.status.success());
    assert!(stdout(&output).contains("(y/N)"));
    assert!(stderr(&output).contains("not compatible"));
    assert_eq!(ctx.read_project()["dependencies"], json!({}));
}

#[test]
fn test_add_incompatible_with_bypass() {
    let ctx = TestContext::new();
    ctx.write_registry(&[physics_manifest()]);
    ctx.write_project(&server_project());

    let output = ctx.pluto(&["add", "physics", "--bypass"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(!stdout(&output).contains("(y/N)"));
    assert_eq!(
        ctx.read_project()["dependencies"]["physics"],
        json!({ "latest": true })
    );
}

#[test]
fn test_add_keeps_declared_order_and_installed_commit() {
    let ctx = TestContext::new();
    ctx.write_registry(&[physics_manifest()]);
    ctx.write_project(&json!({
        "name": "game",
        "runtime": "Lua5.1",
        "frameworks": ["love11"],
        "dependencies": {
            "zeta": { "latest": true, "installedCommit": "0123abcd" }
        }
    }));

    let output = ctx.pluto(&["add", "physics", "--tag", "v1.0"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let raw = std::fs::read_to_string(ctx.project.join("module.json")).expect("read module.json");
    let zeta = raw.find("\"zeta\"").expect("zeta is kept");
    let physics = raw.find("\"physics\"").expect("physics is added");
    assert!(zeta < physics, "declared order changed:\n{raw}");
    assert_eq!(
        ctx.read_project()["dependencies"]["zeta"],
        json!({ "latest": true, "installedCommit": "0123abcd" })
    );
}

#[test]
fn test_no_color_output_is_plain() {
    let ctx = TestContext::new();
    ctx.write_registry(&[physics_manifest()]);
    ctx.write_project(&server_project());

    let runs: [&[&str]; 3] = [
        &["list", "--all"],
        &["add", "physics", "--bypass"],
        &["inspect", "physics"],
    ];
    for args in runs {
        let output = ctx.pluto(args);
        assert!(output.status.success(), "stderr: {}", stderr(&output));
        assert!(!stdout(&output).contains('\x1b'), "escape in {args:?}");
        assert!(!stderr(&output).contains('\x1b'), "escape in {args:?}");
    }
}

#[test]
fn test_list_filters_by_compat() {
    let ctx = TestContext::new();
    let mut server = physics_manifest();
    server["name"] = json!("httpd");
    server["runtime"] = json!("Lua5.4");
    server["frameworks"] = json!(["lapis"]);
    ctx.write_registry(&[physics_manifest(), server]);
    ctx.write_project(&json!({
        "name": "game",
        "runtime": "Lua5.1",
        "frameworks": ["love11"],
        "dependencies": {}
    }));

    let output = ctx.pluto(&["list"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let listed = stdout(&output);
    assert!(listed.contains("physics"));
    assert!(!listed.contains("httpd"));

    let output = ctx.pluto(&["list", "--all"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("httpd"));
}

#[test]
fn test_list_installed_requires_project() {
    let ctx = TestContext::new();
    let output = ctx.pluto(&["list", "--installed"]);
    assert!(!output.status.success());
}

#[test]
fn test_inspect_shows_tags() {
    let ctx = TestContext::new();
    ctx.write_registry(&[physics_manifest()]);

    let output = ctx.pluto(&["inspect", "physics", "--tags"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let shown = stdout(&output);
    assert!(shown.contains("Rigid body helpers"));
    assert!(shown.contains("v1.1"));
    assert!(shown.contains("01234567"));
}

#[test]
fn test_missing_registry_points_at_fetch() {
    let ctx = TestContext::new();
    std::fs::remove_file(ctx.home.join("moduleMap.json")).expect("failed to remove mapping");

    let output = ctx.pluto(&["inspect", "physics"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("fetch"));
}
