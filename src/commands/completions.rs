//! # Completions Command
//!
//! Writes a completion script for the chosen shell to stdout:
//!
//! ```bash
//! iproj completions bash > ~/.local/share/bash-completion/completions/iproj
//! iproj completions zsh > ~/.zfunc/_iproj
//! ```

use std::io;

use anyhow::Result;
use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};

use crate::cli::Cli;

/// Generate shell completion scripts
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// The shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

pub fn execute(args: CompletionsArgs) -> Result<()> {
    let mut cmd = Cli::command();
    generate(args.shell, &mut cmd, "iproj", &mut io::stdout());
    Ok(())
}
