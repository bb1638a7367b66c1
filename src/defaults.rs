//! Default values for iproj configuration.
//!
//! This module provides the conventional file names of an IBM i project,
//! ensuring every component agrees on where to look.

/// Project descriptor at the project root.
pub const DESCRIPTOR_FILENAME: &str = "iproj.json";

/// Variable substitution file at the project root.
pub const ENV_FILENAME: &str = ".env";

/// Directory-scoped build override file.
pub const OVERRIDE_FILENAME: &str = ".ibmi.json";

/// Directory holding build logs, relative to the project root.
pub const LOG_DIRNAME: &str = ".logs";

/// Job log written by the build tool inside [`LOG_DIRNAME`].
pub const JOB_LOG_FILENAME: &str = "joblog.json";

/// Free-text build output inside [`LOG_DIRNAME`].
pub const OUTPUT_LOG_FILENAME: &str = "output.log";

/// Version written into newly created override files.
pub const OVERRIDE_VERSION: &str = "0.0.1";

/// Number of previous job logs kept in memory per project.
pub const DEFAULT_JOB_LOG_CAPACITY: usize = 10;

/// Directories never scanned for override files.
pub const SKIPPED_DIRS: &[&str] = &[".git", LOG_DIRNAME, "node_modules"];
