//! IceCream CLI - Operator tools for the IceCream API store.
//!
//! # Usage
//!
//! ```bash
//! # Load users and ice creams from a JSON file
//! icecream-cli seed ice.json
//!
//! # Show what the store holds
//! icecream-cli stats
//! ```
//!
//! Both commands read the same `ICECREAM_*` environment variables as the API
//! server, so they talk to the same store.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "icecream-cli")]
#[command(author, version, about = "IceCream API operator tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create users and ice creams from a JSON seed file
    Seed {
        /// Path to a `{"users": [...], "icecreams": [...]}` file
        file: String,
    },
    /// Print ice-cream, order and startup counts
    Stats,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Seed { file } => commands::seed::from_file(&file).await?,
        Commands::Stats => commands::stats::print().await?,
    }
    Ok(())
}
