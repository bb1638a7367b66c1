//! End-to-end tests for the `iproj state` command.

mod common;
use common::prelude::*;

#[test]
fn test_state_prints_resolved_values() {
    let fixture = TestFixture::scenario();
    fixture
        .command()
        .arg("state")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""curlib": "QGPL""#))
        .stdout(predicate::str::contains("SYSTOOLS"))
        .stdout(predicate::str::contains("&CURLIB").not());
}

#[test]
fn test_state_raw_keeps_references() {
    let fixture = TestFixture::scenario();
    fixture
        .command()
        .args(["state", "--raw"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""curlib": "&CURLIB""#))
        .stdout(predicate::str::contains("&lib1"));
}

#[test]
fn test_state_output_is_json() {
    let fixture = TestFixture::new().with_descriptor(descriptors::LITERAL);
    let output = fixture.command().arg("state").output().unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["objlib"], "MYLIB");
    assert_eq!(json["buildCommand"], "makei build");
}

#[test]
fn test_missing_variable_stays_literal() {
    let fixture = TestFixture::new()
        .with_descriptor(descriptors::SCENARIO)
        .with_env("CURLIB=QGPL\n");
    fixture
        .command()
        .arg("state")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""&lib1""#));
}

#[test]
fn test_state_without_descriptor_fails() {
    let fixture = TestFixture::new();
    fixture
        .command()
        .arg("state")
        .assert()
        .failure()
        .stderr(predicate::str::contains("iproj.json"));
}

#[test]
fn test_state_with_malformed_descriptor_fails() {
    let fixture = TestFixture::new().with_descriptor(descriptors::MALFORMED);
    fixture.command().arg("state").assert().failure();
}

#[test]
fn test_project_from_environment_variable() {
    let fixture = TestFixture::scenario();
    let mut cmd = cargo_bin_cmd!("iproj");
    cmd.env("IPROJ_PROJECT", fixture.path())
        .arg("state")
        .assert()
        .success()
        .stdout(predicate::str::contains("QGPL"));
}
