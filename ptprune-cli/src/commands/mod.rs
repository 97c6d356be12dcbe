//! CLI command implementations

use crate::error::CliResult;
use clap::Subcommand;

pub mod generate_config;
pub mod prune;

/// Available CLI commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Prune a phrase table, keeping its least compositional pairs
    Prune(prune::PruneArgs),

    /// Generate a configuration file template
    GenerateConfig(generate_config::GenerateConfigArgs),
}

impl Commands {
    /// Runs the selected command
    pub fn execute(&self) -> CliResult<()> {
        match self {
            Commands::Prune(args) => args.execute(),
            Commands::GenerateConfig(args) => args.execute(),
        }
    }
}
