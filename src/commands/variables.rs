//! # Variables Command
//!
//! Lists every `&NAME` the descriptor references together with its value in
//! `.env`. With `--missing` only names that have no entry are printed, one
//! per line, so the output can be piped.

use anyhow::Result;
use clap::Args;

use iproj::output;
use iproj::project::Project;

/// List the variables the descriptor references
#[derive(Args, Debug)]
pub struct VariablesArgs {
    /// Only print variables that have no entry in .env.
    #[arg(long)]
    pub missing: bool,
}

pub fn execute(args: VariablesArgs, project: &Project) -> Result<()> {
    if args.missing {
        for name in project.missing_variables()? {
            println!("{}", name);
        }
        return Ok(());
    }

    let env = project.env()?;
    for name in project.variables()? {
        println!(
            "{}={}",
            name,
            output::variable_value(env.get(&name).map(String::as_str))
        );
    }
    Ok(())
}
