//! # Env Command
//!
//! Edits the project's `.env` file in place. Existing lines are replaced,
//! new names are appended, and everything else in the file is left as is.

use anyhow::Result;
use clap::{Args, Subcommand};

use iproj::project::Project;

/// Edit the project's .env file
#[derive(Args, Debug)]
pub struct EnvArgs {
    #[command(subcommand)]
    pub command: EnvCommand,
}

#[derive(Subcommand, Debug)]
pub enum EnvCommand {
    /// Set one or more variables
    Set {
        /// Assignments in NAME=VALUE form
        #[arg(required = true, value_name = "NAME=VALUE", value_parser = parse_assignment)]
        assignments: Vec<(String, String)>,
    },
    /// Add an empty entry for every referenced variable missing from .env
    Ensure,
}

fn parse_assignment(raw: &str) -> std::result::Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", raw))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing variable name in '{}'", raw));
    }
    Ok((name.to_string(), value.to_string()))
}

pub fn execute(args: EnvArgs, project: &Project) -> Result<()> {
    match args.command {
        EnvCommand::Set { assignments } => {
            project.update_env(assignments)?;
        }
        EnvCommand::Ensure => {
            for name in project.ensure_variables()? {
                println!("Added {}", name);
            }
        }
    }
    Ok(())
}
