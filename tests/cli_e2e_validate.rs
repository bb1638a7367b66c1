//! End-to-end tests for the `iproj validate` command.

mod common;
use common::prelude::*;

#[test]
fn test_validate_valid_descriptor() {
    let fixture = TestFixture::scenario();
    fixture
        .command()
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("[OK]"))
        .stdout(predicate::str::contains("is valid"));
}

#[test]
fn test_validate_reports_violation_paths() {
    let fixture = TestFixture::new().with_descriptor(descriptors::BAD_OBJLIB);
    fixture
        .command()
        .arg("validate")
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "[ERR] /objlib: expected string, found number",
        ))
        .stderr(predicate::str::contains("1 schema violation"));
}

#[test]
fn test_validate_malformed_json() {
    let fixture = TestFixture::new().with_descriptor(descriptors::MALFORMED);
    fixture.command().arg("validate").assert().failure();
}

#[test]
fn test_validate_missing_variables_warn() {
    let fixture = TestFixture::new().with_descriptor(descriptors::SCENARIO);
    fixture
        .command()
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "[WARN] variable CURLIB is not set in .env",
        ));
}

#[test]
fn test_validate_strict_fails_on_missing_variables() {
    let fixture = TestFixture::new().with_descriptor(descriptors::SCENARIO);
    fixture
        .command()
        .args(["validate", "--strict"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("[ERR] variable lib1"));
}
