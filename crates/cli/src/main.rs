//! Online shopping CLI - Database migrations and maintenance tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! shop-cli migrate
//!
//! # Load customers, products and orders from a fixture file
//! shop-cli seed crates/cli/fixtures/seed.yaml
//!
//! # Restock every product below 5 units by 20
//! shop-cli restock --low-level 5 --amount 20
//! ```
//!
//! All commands read `SHOP_DATABASE_URL` (or `DATABASE_URL`), loading `.env`
//! if present.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "shop-cli")]
#[command(author, version, about = "Online shopping CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database from a YAML fixture file
    Seed {
        /// Path to the fixture file
        file: String,
    },
    /// Raise the stock of every product below a threshold
    Restock {
        /// Products with fewer units than this are restocked
        #[arg(short, long)]
        low_level: Option<i32>,

        /// Units added to each restocked product
        #[arg(short, long)]
        amount: Option<i32>,
    },
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
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { file } => commands::seed::from_file(&file).await?,
        Commands::Restock { low_level, amount } => {
            commands::restock::run(low_level, amount).await?;
        }
    }
    Ok(())
}
