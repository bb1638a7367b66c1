//! CLI argument parsing and command dispatch

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::debug;

use iproj::output::{ColorChoice, Output};
use iproj::project::Project;
use iproj::registry::ProjectRegistry;

use crate::commands;

/// iproj - Inspect and edit IBM i iproj.json projects
#[derive(Parser, Debug)]
#[command(name = "iproj")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Project root containing iproj.json
    #[arg(
        long,
        global = true,
        value_name = "DIR",
        env = "IPROJ_PROJECT",
        default_value = "."
    )]
    project: PathBuf,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the project state as JSON
    State(commands::state::StateArgs),

    /// List the variables the descriptor references
    Variables(commands::variables::VariablesArgs),

    /// Check iproj.json against the descriptor schema
    Validate(commands::validate::ValidateArgs),

    /// Show the last job log
    Joblog(commands::joblog::JoblogArgs),

    /// Edit the project's .env file
    Env(commands::env::EnvArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

fn load_project(dir: &Path) -> Result<Arc<Project>> {
    let root = dir
        .canonicalize()
        .with_context(|| format!("Project directory {} not found", dir.display()))?;
    debug!("Using project root {}", root.display());
    let registry = ProjectRegistry::default();
    Ok(registry.load(&root)?)
}

impl Cli {
    fn init_logging(&self) {
        let env = env_logger::Env::default().default_filter_or(self.log_level.as_str());
        let _ = env_logger::Builder::from_env(env)
            .format_timestamp(None)
            .try_init();
    }

    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        self.init_logging();
        let out = Output::new(ColorChoice::from_flag(&self.color)).install();

        match self.command {
            Commands::Completions(args) => commands::completions::execute(args),
            command => {
                let project = load_project(&self.project)?;
                match command {
                    Commands::State(args) => commands::state::execute(args, &project),
                    Commands::Variables(args) => commands::variables::execute(args, &project),
                    Commands::Validate(args) => commands::validate::execute(args, &project, &out),
                    Commands::Joblog(args) => commands::joblog::execute(args, &project, &out),
                    Commands::Env(args) => commands::env::execute(args, &project),
                    Commands::Completions(args) => commands::completions::execute(args),
                }
            }
        }
    }
}
