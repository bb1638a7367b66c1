//! # iproj CLI
//!
//! Binary entry point for the `iproj` command-line tool. It parses the
//! arguments with `clap` and dispatches to a command; all project logic
//! lives in the `iproj` library crate.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
