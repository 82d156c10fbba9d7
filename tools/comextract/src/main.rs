mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{dimensions::DimensionsArgs, fetch::FetchArgs};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "comextract", about = "Extract Eurostat/Comext datasets to various formats")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a dataset and write it as csv/json/jsonl/parquet
    Fetch(FetchArgs),
    /// Print the dimensions and categories of a dataset
    Dimensions(DimensionsArgs),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("comext=info,comextract=info,warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch(args) => args.run(),
        Commands::Dimensions(args) => args.run(),
    }
}
