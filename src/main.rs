//! hotel-indexer - Concurrent hotel data aggregation
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use hotel_indexer::config::{BuildConfig, CliArgs};
use hotel_indexer::ingest::{IndexBuilder, PlacesClient};
use hotel_indexer::report;
use hotel_indexer::store::AggregateStore;
use hotel_indexer::sync::WorkQueue;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    // Parse CLI arguments
    let args = CliArgs::parse();

    // Setup logging
    setup_logging(args.verbose)?;

    // Validate and create config
    let config = BuildConfig::from_args(args).context("Invalid configuration")?;

    // Assemble the pipeline
    let store = Arc::new(AggregateStore::new());
    let queue = Arc::new(
        WorkQueue::new(config.worker_count).context("Failed to start worker pool")?,
    );

    let api_key = config.api_key.clone().unwrap_or_default();
    let client = match &config.places_url {
        Some(url) => PlacesClient::with_base_url(url.clone(), api_key),
        None => PlacesClient::new(api_key),
    }
    .context("Failed to build places client")?;

    let builder = IndexBuilder::new(Arc::clone(&store), Arc::clone(&queue), Arc::new(client));

    // Phase 1: bulk hotel load, synchronous
    let hotels = builder
        .load_hotels(&config.hotels_file)
        .context("Hotel load failed")?;

    // Phase 2: fan review parsing out over the pool
    let review_files = builder
        .load_reviews(&config.reviews_dir)
        .context("Review directory traversal failed")?;

    // Phase 3: attraction fetches, only when there is a key to send
    let fetches = if config.fetch_enabled() {
        builder
            .fetch_attractions(config.radius_miles)
            .context("Attraction fan-out failed")?
    } else {
        info!("no API key provided, skipping attraction fetches");
        0
    };

    builder.wait_until_finished();

    // Reports render only after the last task has merged
    report::write_hotel_report(&store, &config.hotel_report)
        .context("Failed to write hotel report")?;
    report::write_attraction_report(&store, &config.attraction_report)
        .context("Failed to write attraction report")?;

    builder.shutdown();

    let stats = queue.stats();
    info!(
        hotels,
        review_files,
        fetches,
        tasks_completed = stats.completed(),
        tasks_panicked = stats.panicked(),
        "build finished"
    );

    Ok(())
}

fn setup_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("hotel_indexer=debug,warn")
    } else {
        EnvFilter::new("hotel_indexer=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    Ok(())
}
