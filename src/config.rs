//! # Engine Configuration
//!
//! [`EngineConfig`] bundles the file names and limits one project engine
//! works with. The defaults come from [`crate::defaults`]; hosts that use a
//! different layout override individual names with the builder setters.
//!
//! ```
//! use iproj::config::EngineConfig;
//!
//! let config = EngineConfig::default().with_job_log_capacity(3);
//! assert_eq!(config.job_log_capacity, 3);
//! assert_eq!(config.descriptor_file, "iproj.json");
//! ```

use std::path::{Path, PathBuf};

use crate::defaults;

/// File layout and limits for a project engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Descriptor file name at the project root.
    pub descriptor_file: String,
    /// Environment file name at the project root.
    pub env_file: String,
    /// Override file name looked up in every directory.
    pub override_file: String,
    /// Log directory, relative to the project root.
    pub log_dir: String,
    /// Job log file name inside `log_dir`.
    pub job_log_file: String,
    /// Output log file name inside `log_dir`.
    pub output_log_file: String,
    /// How many job logs are kept in memory.
    pub job_log_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            descriptor_file: defaults::DESCRIPTOR_FILENAME.to_string(),
            env_file: defaults::ENV_FILENAME.to_string(),
            override_file: defaults::OVERRIDE_FILENAME.to_string(),
            log_dir: defaults::LOG_DIRNAME.to_string(),
            job_log_file: defaults::JOB_LOG_FILENAME.to_string(),
            output_log_file: defaults::OUTPUT_LOG_FILENAME.to_string(),
            job_log_capacity: defaults::DEFAULT_JOB_LOG_CAPACITY,
        }
    }
}

impl EngineConfig {
    pub fn with_env_file(mut self, name: impl Into<String>) -> Self {
        self.env_file = name.into();
        self
    }

    pub fn with_override_file(mut self, name: impl Into<String>) -> Self {
        self.override_file = name.into();
        self
    }

    pub fn with_job_log_capacity(mut self, capacity: usize) -> Self {
        self.job_log_capacity = capacity;
        self
    }

    pub fn descriptor_path(&self, root: &Path) -> PathBuf {
        root.join(&self.descriptor_file)
    }

    pub fn env_path(&self, root: &Path) -> PathBuf {
        root.join(&self.env_file)
    }

    pub fn job_log_path(&self, root: &Path) -> PathBuf {
        root.join(&self.log_dir).join(&self.job_log_file)
    }

    pub fn output_log_path(&self, root: &Path) -> PathBuf {
        root.join(&self.log_dir).join(&self.output_log_file)
    }
}
