//! # CLI Command Implementations
//!
//! One module per `iproj` subcommand. Each defines an `Args` struct derived
//! with `clap` and an `execute` function that calls into the `iproj`
//! library for the actual work.

pub mod completions;
pub mod env;
pub mod joblog;
pub mod state;
pub mod validate;
pub mod variables;
