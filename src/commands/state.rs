//! # State Command
//!
//! Prints the project descriptor as pretty JSON, with variables resolved
//! from `.env` unless `--raw` is given. Read-only.

use anyhow::Result;
use clap::Args;

use iproj::project::Project;

/// Print the project state as JSON
#[derive(Args, Debug)]
pub struct StateArgs {
    /// Print the descriptor as written, without substituting variables.
    #[arg(long)]
    pub raw: bool,
}

pub fn execute(args: StateArgs, project: &Project) -> Result<()> {
    let state = if args.raw {
        project.unresolved_state()?
    } else {
        project.state()?
    };
    println!("{}", serde_json::to_string_pretty(&state)?);
    Ok(())
}
