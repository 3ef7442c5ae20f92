//! Listing importer CLI.
//!
//! ```text
//! listings.json ──▶ load_listings ──▶ BatchImporter ──▶ FileSink (<out>/<mls>.json)
//!                                          │
//!                                          └──▶ ImportSummary (stdout, JSON)
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use listing_import::config::{load_config, ImportConfig};
use listing_import::import::{load_listings, BatchImporter, FileSink};
use listing_import::observability::{logging, metrics};
use listing_import::resilience::BackoffPolicy;

#[derive(Parser)]
#[command(name = "listing-import")]
#[command(about = "Import MLS listings with retry and backoff", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a JSON array of listings into a directory
    Import {
        /// Listings file (JSON array)
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory, one JSON file per listing
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Print the backoff window for each retry
    Schedule {
        /// Number of attempts (defaults to retries.max_attempts)
        #[arg(short, long)]
        attempts: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ImportConfig::default(),
    };

    logging::init(&config.observability);
    tracing::info!(
        max_attempts = config.retries.max_attempts,
        base_delay_ms = config.retries.base_delay_ms,
        jitter_ms = config.retries.jitter_ms,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse::<SocketAddr>()?);
    }

    match cli.command {
        Commands::Import { input, output } => {
            let listings = load_listings(&input).await?;
            tracing::info!(input = ?input, count = listings.len(), "Listings loaded");

            let importer = BatchImporter::from_config(&config.retries);
            let sink = FileSink::new(output);
            let summary = importer.import_listings(listings, &sink).await;

            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Schedule { attempts } => {
            let attempts = attempts.unwrap_or(config.retries.max_attempts);
            let policy = BackoffPolicy::from(&config.retries);
            for window in policy.schedule(attempts) {
                println!("{}", window);
            }
        }
    }

    Ok(())
}
