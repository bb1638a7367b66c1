//! # Error Handling
//!
//! This module defines the centralized error type for the `iproj` engine.
//! It uses the `thiserror` library to describe every failure mode that is
//! surfaced to callers as an `Err`, with a message that names the file or
//! operation involved.
//!
//! Not every problem is an error. Following the project model:
//!
//! - Malformed input (an unparseable `iproj.json`, a garbled job-log
//!   timestamp) is returned as an `Error`.
//! - Schema violations are soft and are reported through
//!   [`crate::validate::ValidationResult`] instead.
//! - A missing variable leaves the literal `&NAME` in place.
//! - Remote lookup failures are logged and the affected entry is omitted.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for iproj operations
#[derive(Error, Debug)]
pub enum Error {
    /// The project descriptor could not be parsed as JSON at all.
    #[error("Project descriptor parse error in {}: {message}", path.display())]
    DescriptorParse { path: PathBuf, message: String },

    /// A directory build override file could not be parsed.
    #[error("Build override parse error in {}: {message}", path.display())]
    OverrideParse { path: PathBuf, message: String },

    /// The job log file is not a JSON array of object records.
    #[error("Job log parse error in {}: {message}", path.display())]
    JobLogParse { path: PathBuf, message: String },

    /// A job log timestamp did not match `YYYY-MM-DD-HH.MM.SS[.ffffff]`.
    #[error("Invalid job log timestamp '{input}': {message}")]
    DateTimeParse { input: String, message: String },

    /// The remote connection reported a failure.
    #[error("Remote operation error: {operation} - {message}")]
    Remote { operation: String, message: String },

    /// No project descriptor exists or is loaded for the given root.
    #[error("No iproj.json project at {}", root.display())]
    ProjectNotFound { root: PathBuf },

    /// A path could not be related to the project root.
    #[error("Path operation error: {message}")]
    Path { message: String },

    /// An error indicating that a mutex or other lock has been poisoned.
    #[error("Lock poisoned: {context}")]
    LockPoisoned { context: String },

    /// An error occurred during serialization.
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

impl<T> From<std::sync::PoisonError<T>> for Error {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Error::LockPoisoned {
            context: err.to_string(),
        }
    }
}
