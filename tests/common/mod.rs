//! Shared test utilities for E2E tests.
//!
//! Add `mod common;` to a test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_descriptor(descriptors::SCENARIO);
//!     fixture.command().arg("state").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::descriptors;
    pub use super::TestFixture;
}

/// Descriptor snippets for testing.
#[allow(dead_code)]
pub mod descriptors {
    /// Current library and one user library through variables.
    pub const SCENARIO: &str = r#"{
  "description": "Payroll",
  "curlib": "&CURLIB",
  "preUsrlibl": ["&lib1"]
}"#;

    /// Environment matching [`SCENARIO`].
    pub const SCENARIO_ENV: &str = "CURLIB=QGPL\nlib1=SYSTOOLS\n";

    /// Literal values only.
    pub const LITERAL: &str = r#"{
  "objlib": "MYLIB",
  "includePath": ["includes"],
  "buildCommand": "makei build"
}"#;

    /// Valid JSON that violates the schema at `/objlib`.
    pub const BAD_OBJLIB: &str = r#"{"objlib": 5, "curlib": "QGPL"}"#;

    /// Not JSON.
    pub const MALFORMED: &str = r#"{"curlib": "#;
}

/// A temporary project directory.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Write `iproj.json` with the given content.
    pub fn with_descriptor(self, content: &str) -> Self {
        self.with_file("iproj.json", content)
    }

    /// Write `.env` with the given content.
    pub fn with_env(self, content: &str) -> Self {
        self.with_file(".env", content)
    }

    /// The `&CURLIB` / `&lib1` project with its environment.
    #[allow(dead_code)]
    pub fn scenario() -> Self {
        Self::new()
            .with_descriptor(descriptors::SCENARIO)
            .with_env(descriptors::SCENARIO_ENV)
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    #[allow(dead_code)]
    pub fn env_path(&self) -> PathBuf {
        self.temp_dir.path().join(".env")
    }

    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// A command pointed at this fixture with `--project`, colours off.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("iproj");
        cmd.env_remove("IPROJ_PROJECT")
            .arg("--project")
            .arg(self.path())
            .arg("--color")
            .arg("never");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_temp_dir() {
        let fixture = TestFixture::new();
        assert!(fixture.path().exists());
    }

    #[test]
    fn test_scenario_writes_both_files() {
        let fixture = TestFixture::scenario();
        assert!(fixture.path().join("iproj.json").exists());
        assert!(fixture.env_path().exists());
    }

    #[test]
    fn test_descriptors_are_json_where_expected() {
        for descriptor in [
            descriptors::SCENARIO,
            descriptors::LITERAL,
            descriptors::BAD_OBJLIB,
        ] {
            serde_json::from_str::<serde_json::Value>(descriptor).expect("valid JSON");
        }
        assert!(serde_json::from_str::<serde_json::Value>(descriptors::MALFORMED).is_err());
    }
}
