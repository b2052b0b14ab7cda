//! CLI command integration tests.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn rev_cmd() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("rev").unwrap()
}

#[test]
fn stats_prints_constants_and_sample() {
    rev_cmd()
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("golden angle"))
        .stdout(predicate::str::contains("glyph cap:      500"))
        .stdout(predicate::str::contains("sampled:"));
}

#[test]
fn demo_runs_a_short_session() {
    rev_cmd()
        .args(["demo", "--ticks", "120", "--points", "200"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cloud:     200 points"))
        .stdout(predicate::str::contains("glyphs:"))
        .stdout(predicate::str::contains("memories:"));
}

#[test]
fn export_then_import_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("memories.json");

    rev_cmd()
        .arg("export")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("exported"));

    let json = std::fs::read_to_string(&path).unwrap();
    assert!(json.contains("\"version\""));

    rev_cmd()
        .arg("import")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("imported"));
}

#[test]
fn import_rejects_garbage() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{not json").unwrap();

    rev_cmd().arg("import").arg(&path).assert().failure();
}
