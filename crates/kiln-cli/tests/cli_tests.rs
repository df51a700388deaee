//! Command-line tests for the `kiln` binary.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

fn kiln_cmd() -> Command {
    cargo_bin_cmd!("kiln")
}

const TEMPLATE: &str = r#"{
    "variables": {"region": "eu-west-1"},
    "builders": [{"type": "docker"}, {"name": "vm", "type": "qemu"}],
    "provisioners": [{"type": "shell", "only": ["vm"]}]
}"#;

#[test]
fn validate_reads_template_from_stdin() {
    kiln_cmd()
        .args(["validate", "-"])
        .write_stdin(TEMPLATE)
        .assert()
        .success()
        .stdout(predicate::str::contains("Template validated successfully."));
}

#[test]
fn validate_rejects_invalid_stdin() {
    kiln_cmd()
        .args(["validate", "-"])
        .write_stdin(r#"{"builders": [{"type": "docker"}], "bogus": 1}"#)
        .assert()
        .failure()
        .stderr(predicate::str::contains("bogus"));
}

#[test]
fn inspect_json_from_file() {
    let dir = tempfile::tempdir().expect("failed to create tempdir");
    let path = dir.path().join("template.json");
    std::fs::write(&path, TEMPLATE).expect("write template");

    let output = kiln_cmd()
        .args(["inspect", "--format", "json"])
        .arg(&path)
        .output()
        .expect("run kiln");
    assert!(output.status.success());

    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json output");
    assert_eq!(doc["builders"]["vm"]["type"], "qemu");
    assert_eq!(doc["variables"]["region"]["default"], "eu-west-1");
}
