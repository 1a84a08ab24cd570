mod export;
mod scrape;
mod sync;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "suqdb")]
#[command(about = "Suq deals aggregation pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run all extraction adapters once and print the results
    Scrape {
        /// Restrict to a single source (by name)
        #[arg(long)]
        source: Option<String>,

        /// Print the full normalized deals as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Scrape all sources and reconcile the result into Postgres
    Sync,
    /// Scrape all sources and overwrite the export Gist with the result
    Export,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = suqdb_core::load_app_config()?;

    match cli.command {
        Commands::Scrape { source, json } => scrape::run(&config, source.as_deref(), json).await,
        Commands::Sync => sync::run(&config).await,
        Commands::Export => export::run(&config).await,
    }
}
