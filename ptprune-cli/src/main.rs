//! ptprune command-line entry point

use clap::Parser;
use ptprune_cli::commands::Commands;

/// Prune phrase tables by compositionality
#[derive(Debug, Parser)]
#[command(name = "ptprune", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cli.command.execute()
}
