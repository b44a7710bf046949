//! End-to-end tests of the `stoke` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn stoke(dir: &Path) -> Command {
    let mut cmd = assert_cmd::cargo_bin_cmd!("stoke");
    cmd.current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("STOKE_HOST");
    cmd
}

fn project_with_sources() -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("src")).unwrap();
    fs::write(temp.path().join("src/index.html"), "<html><body></body></html>").unwrap();
    fs::write(temp.path().join("src/app.js"), "console.log('app');").unwrap();
    temp
}

#[test]
fn test_help_lists_commands() {
    let temp = TempDir::new().unwrap();
    stoke(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("dev"))
        .stdout(predicate::str::contains("build"));
}

#[test]
fn test_build_copies_sources() {
    let temp = project_with_sources();

    stoke(temp.path())
        .args(["build", "--typescript", "false"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Compiled successfully!"));

    assert!(temp.path().join("dist/statics/app.js").is_file());
}

#[test]
fn test_build_without_sources_fails() {
    let temp = TempDir::new().unwrap();

    stoke(temp.path())
        .arg("build")
        .assert()
        .failure()
        .stderr(predicate::str::contains("srcDir"));
}

#[test]
fn test_dev_without_sources_fails() {
    let temp = TempDir::new().unwrap();

    stoke(temp.path())
        .args(["dev", "--cdn-port", "39217"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("srcDir"));
}

#[test]
fn test_missing_build_tool_fails_to_compile() {
    let temp = project_with_sources();
    fs::write(
        temp.path().join("stoke.config.json"),
        r#"{ "build": { "command": ["stoke-missing-build-tool"] } }"#,
    )
    .unwrap();

    stoke(temp.path())
        .arg("build")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to compile."));
}

#[test]
fn test_conflicting_ports_are_rejected() {
    let temp = project_with_sources();
    fs::write(
        temp.path().join("stoke.config.json"),
        r#"{ "servers": { "app": { "port": 4000 }, "cdn": { "port": 4000 } } }"#,
    )
    .unwrap();

    stoke(temp.path())
        .arg("build")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}

#[cfg(unix)]
#[test]
fn test_build_fails_on_type_errors() {
    let temp = project_with_sources();
    fs::write(temp.path().join("tsconfig.json"), "{}").unwrap();
    fs::write(
        temp.path().join("stoke.config.json"),
        r#"{ "typecheck": { "command": ["sh", "-c", "echo 'src/app.ts(3,7): error TS2322: Type mismatch.'; exit 2"] } }"#,
    )
    .unwrap();

    stoke(temp.path())
        .arg("build")
        .assert()
        .failure()
        .stdout(predicate::str::contains("Failed to compile."))
        .stdout(predicate::str::contains("TS2322"))
        .stderr(predicate::str::contains("Build failed with 1 error(s)"));
}
