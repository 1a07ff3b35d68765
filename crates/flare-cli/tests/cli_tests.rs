//! Integration tests for the flare CLI.
//!
//! The compiler-invoking commands need a real SDK, so these tests cover
//! the subprocess-free surface: class enumeration, cleaning, and the
//! configuration error paths.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn flare_cmd() -> Command {
    let mut cmd = Command::from(assert_cmd::cargo::cargo_bin_cmd!("flare"));
    cmd.env_remove("FLARE_SDK");
    cmd
}

/// Workspace with an SDK skeleton and one project
fn make_workspace(manifest: &str) -> (TempDir, PathBuf) {
    let ws = TempDir::new().unwrap();
    fs::create_dir_all(ws.path().join("sdk/frameworks")).unwrap();
    fs::create_dir_all(ws.path().join("sdk/lib")).unwrap();

    let project = ws.path().join("game");
    fs::create_dir_all(project.join("src")).unwrap();
    fs::write(project.join("flare.toml"), manifest).unwrap();
    (ws, project)
}

fn sdk_arg(ws: &TempDir) -> String {
    ws.path().join("sdk").display().to_string()
}

const ARCHIVE_MANIFEST: &str = r#"
[project]
name = "game"

[build]
swc = true
sources = ["src"]
"#;

#[test]
fn test_classes_writes_manifest() {
    let (ws, project) = make_workspace(ARCHIVE_MANIFEST);
    fs::create_dir_all(project.join("src/foo")).unwrap();
    fs::write(project.join("src/foo/Bar.as"), "package foo {}").unwrap();

    flare_cmd()
        .args([
            "classes",
            "--project-dir",
            &project.display().to_string(),
            "--sdk",
            &sdk_arg(&ws),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 step(s) executed"));

    let manifest = fs::read_to_string(project.join("build/tmp/classes.xml")).unwrap();
    assert!(manifest.contains("<symbol>foo.Bar</symbol>"));
}

#[test]
fn test_classes_second_run_is_up_to_date() {
    let (ws, project) = make_workspace(ARCHIVE_MANIFEST);
    fs::write(project.join("src/Main.as"), "package {}").unwrap();

    let args = [
        "classes".to_string(),
        "--project-dir".to_string(),
        project.display().to_string(),
        "--sdk".to_string(),
        sdk_arg(&ws),
        "--json".to_string(),
    ];

    flare_cmd()
        .args(&args)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"executed\":1"));

    flare_cmd()
        .args(&args)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"skipped\":1"));
}

#[test]
fn test_clean_removes_build_directory() {
    let (ws, project) = make_workspace(ARCHIVE_MANIFEST);
    fs::create_dir_all(project.join("build/libs")).unwrap();
    fs::write(project.join("build/libs/library.swc"), b"stale").unwrap();

    flare_cmd()
        .args([
            "clean",
            "--project-dir",
            &project.display().to_string(),
            "--sdk",
            &sdk_arg(&ws),
        ])
        .assert()
        .success();

    assert!(!project.join("build").exists());
}

#[test]
fn test_build_rejects_empty_artifact_selection() {
    let (ws, project) = make_workspace(
        r#"
[project]
name = "game"
"#,
    );

    flare_cmd()
        .args([
            "build",
            "--project-dir",
            &project.display().to_string(),
            "--sdk",
            &sdk_arg(&ws),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nothing to build"));
}

#[test]
fn test_missing_sdk_is_fatal() {
    let (_ws, project) = make_workspace(ARCHIVE_MANIFEST);

    flare_cmd()
        .args(["build", "--project-dir", &project.display().to_string()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("SDK"));
}

#[test]
fn test_missing_manifest_is_fatal() {
    let ws = TempDir::new().unwrap();

    flare_cmd()
        .args(["build", "--project-dir", &ws.path().display().to_string()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load project"));
}

#[test]
fn test_ide_generates_module_file() {
    let (ws, project) = make_workspace(ARCHIVE_MANIFEST);

    flare_cmd()
        .args([
            "ide",
            "--project-dir",
            &project.display().to_string(),
            "--workspace-root",
            &ws.path().display().to_string(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("game.iml"));

    let iml = ws.path().join(".idea/modules/game/game.iml");
    let content = fs::read_to_string(&iml).unwrap();
    assert!(content.contains("<module type=\"Flex\" version=\"4\">"));
}

#[test]
fn test_help_lists_step_commands() {
    let output = flare_cmd().arg("--help").assert().success();
    let stdout = String::from_utf8_lossy(&output.get_output().stdout).to_string();
    for command in ["build", "compile-swc", "compile-swf", "classes", "extract-swf", "clean", "ide"] {
        assert!(stdout.contains(command), "missing command: {command}");
    }
}
