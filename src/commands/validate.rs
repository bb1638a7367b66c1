//! # Validate Command Implementation
//!
//! Reads `iproj.json` and reports every schema violation as
//! `path: message`. The command fails when the file is not valid JSON or
//! when any violation is found; the descriptor is never modified.

use anyhow::{bail, Result};
use clap::Args;

use iproj::output::{Output, Status};
use iproj::project::Project;

/// Check iproj.json against the descriptor schema
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Also fail when referenced variables have no entry in .env.
    #[arg(long)]
    pub strict: bool,
}

pub fn execute(args: ValidateArgs, project: &Project, out: &Output) -> Result<()> {
    let path = project.descriptor_path();
    let validation = project.validation()?;

    for violation in &validation.violations {
        println!("{} {}", out.marker(Status::Error), violation);
    }

    let missing = project.missing_variables()?;
    for name in &missing {
        let status = if args.strict {
            Status::Error
        } else {
            Status::Warning
        };
        println!("{} variable {} is not set in .env", out.marker(status), name);
    }

    if !validation.is_valid() {
        bail!(
            "{} has {} schema violation(s)",
            path.display(),
            validation.violations.len()
        );
    }
    if args.strict && !missing.is_empty() {
        bail!("{} variable(s) missing from .env", missing.len());
    }
    println!("{} {} is valid", out.marker(Status::Ok), path.display());
    Ok(())
}
