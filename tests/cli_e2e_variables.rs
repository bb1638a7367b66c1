//! End-to-end tests for the `iproj variables` and `iproj env` commands.

mod common;
use common::prelude::*;

#[test]
fn test_variables_in_reference_order() {
    let fixture = TestFixture::scenario();
    fixture
        .command()
        .arg("variables")
        .assert()
        .success()
        .stdout(predicate::eq("CURLIB=QGPL\nlib1=SYSTOOLS\n"));
}

#[test]
fn test_variables_distinguish_unset_from_empty() {
    let fixture = TestFixture::new()
        .with_descriptor(r#"{"preUsrlibl": ["&lib1", "&lib2"]}"#)
        .with_env("lib2=\n");
    fixture
        .command()
        .arg("variables")
        .assert()
        .success()
        .stdout(predicate::str::contains("lib1=(not set)"))
        .stdout(predicate::str::contains("lib2=(empty)"));
}

#[test]
fn test_variables_missing_only() {
    let fixture = TestFixture::new()
        .with_descriptor(descriptors::SCENARIO)
        .with_env("CURLIB=QGPL\n");
    fixture
        .command()
        .args(["variables", "--missing"])
        .assert()
        .success()
        .stdout(predicate::eq("lib1\n"));
}

#[test]
fn test_env_set_updates_in_place() {
    let fixture = TestFixture::scenario();
    fixture
        .command()
        .args(["env", "set", "CURLIB=DEVLIB", "OBJLIB=MYLIB"])
        .assert()
        .success();

    fixture
        .child(".env")
        .assert("CURLIB=DEVLIB\nlib1=SYSTOOLS\nOBJLIB=MYLIB\n");
    fixture
        .command()
        .arg("state")
        .assert()
        .success()
        .stdout(predicate::str::contains("DEVLIB"));
}

#[test]
fn test_env_set_rejects_bad_assignment() {
    let fixture = TestFixture::scenario();
    fixture
        .command()
        .args(["env", "set", "NOVALUE"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("NAME=VALUE"));
}

#[test]
fn test_env_ensure_adds_missing_names() {
    let fixture = TestFixture::new().with_descriptor(descriptors::SCENARIO);
    fixture
        .command()
        .args(["env", "ensure"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added CURLIB"))
        .stdout(predicate::str::contains("Added lib1"));
    fixture.child(".env").assert("CURLIB=\nlib1=");
}
