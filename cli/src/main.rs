mod db;
mod import;
mod models;
mod resolve;
mod schema;
mod store;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "larder")]
#[command(about = "Recipe ingredient resolution pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve raw ingredient lines against the canonical dictionary
    Resolve {
        /// Resolve a single recipe by id (default: all recipes)
        #[arg(long)]
        recipe: Option<Uuid>,
        /// Recipes per batch between pacing delays
        #[arg(long, default_value_t = 8)]
        batch_size: usize,
        /// Pacing delay between batches, in milliseconds
        #[arg(long, default_value_t = 1500)]
        pace_ms: u64,
        /// Run the full pipeline but write nothing
        #[arg(long)]
        dry_run: bool,
    },
    /// Import a recipe export archive
    Import {
        /// Path to the export file
        file: PathBuf,
        /// Maximum archive nesting depth
        #[arg(long, default_value_t = 3)]
        max_depth: u8,
    },
}

fn init_telemetry() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_telemetry();

    let cli = Cli::parse();
    let pool = db::create_pool()?;

    match cli.command {
        Commands::Resolve {
            recipe,
            batch_size,
            pace_ms,
            dry_run,
        } => {
            resolve::run(
                pool,
                resolve::ResolveArgs {
                    recipe,
                    batch_size,
                    pace_ms,
                    dry_run,
                },
            )
            .await?;
        }
        Commands::Import { file, max_depth } => {
            import::run(pool, &file, max_depth)?;
        }
    }

    Ok(())
}
